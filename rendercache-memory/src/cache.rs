//  Copyright 2024 rendercache contributors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! The generic cache engine.
//!
//! `Cache<K, V, C>` is parameterized by key, value and an opaque per-item
//! context, rather than by a swappable eviction policy: there is exactly one
//! eviction algorithm (frame-aware, current-frame items never evicted), so
//! there is only one queue implementation here (see `queue.rs`), not a
//! pluggable `Eviction` trait.

use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;
use rendercache_common::code::{Key, Value};
use rendercache_common::error::CacheError;
use rendercache_common::hash::FixedState;
use rendercache_common::metrics::{Metrics, MetricsSnapshot};
use tracing::{debug, trace};

use crate::client::{Client, ClientShared};
use crate::construct::ConstructionBarrier;
use crate::item::{size_contribution, Item, CONSTRUCTING};
use crate::listener::{CacheEventListener, NoopListener};
use crate::queue::Queue;

const DEFAULT_BUCKETS: usize = 4096;

/// Builds a [`Cache`].
pub struct CacheBuilder<K, V, C = ()> {
    buckets: usize,
    listener: Option<Box<dyn CacheEventListener<K, V, C>>>,
    _marker: PhantomData<fn() -> C>,
}

impl<K: Key, V: Value, C: Send + Sync + 'static> Default for CacheBuilder<K, V, C> {
    fn default() -> Self {
        Self { buckets: DEFAULT_BUCKETS, listener: None, _marker: PhantomData }
    }
}

impl<K: Key, V: Value, C: Send + Sync + 'static> CacheBuilder<K, V, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of striped shards. Generalizes the original's hardcoded
    /// `0xFFFF`-entry table.
    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_listener(mut self, listener: impl CacheEventListener<K, V, C> + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn build(self) -> Result<Cache<K, V, C>, CacheError> {
        if self.buckets == 0 {
            return Err(CacheError::InvalidConfig("bucket count must be non-zero".into()));
        }
        let mut buckets = Vec::with_capacity(self.buckets);
        buckets.resize_with(self.buckets, || Mutex::new(HashMap::new()));

        let inner = Arc::new(CacheInner {
            buckets,
            hash_builder: FixedState::new(),
            queue: Mutex::new(Queue::default()),
            clients: Mutex::new(Vec::new()),
            total_size: AtomicUsize::new(0),
            item_count: AtomicUsize::new(0),
            current_frame: AtomicU64::new(0),
            metrics: Metrics::new(),
            listener: self.listener.unwrap_or_else(|| Box::new(NoopListener)),
        });
        Ok(Cache { inner })
    }
}

pub(crate) struct CacheInner<K, V, C> {
    /// One shard per stripe, each a small index of its own (the same split
    /// foyer's `Indexer`/`CacheShard` make): the outer `Vec` distributes load
    /// across locks, the inner `HashMap` gives each shard O(1) lookup instead
    /// of a linear chain scan.
    buckets: Vec<Mutex<HashMap<K, NonNull<Item<K, V, C>>>>>,
    hash_builder: FixedState,
    queue: Mutex<Queue<K, V, C>>,
    clients: Mutex<Vec<Arc<ClientShared<K, V, C>>>>,
    total_size: AtomicUsize,
    item_count: AtomicUsize,
    current_frame: AtomicU64,
    metrics: Metrics,
    listener: Box<dyn CacheEventListener<K, V, C>>,
}

// SAFETY: every field is either a lock-guarded collection of `NonNull`
// pointers, a plain atomic, or `Send + Sync` on its own; `Item` access
// through the raw pointers is always performed under the owning lock (see
// the field comments on `Item`).
unsafe impl<K: Key, V: Value, C: Send + Sync> Send for CacheInner<K, V, C> {}
unsafe impl<K: Key, V: Value, C: Send + Sync> Sync for CacheInner<K, V, C> {}

impl<K: Key, V: Value, C: Send + Sync + 'static> CacheInner<K, V, C> {
    fn bucket_index(&self, hash: u64) -> usize {
        (hash as usize) % self.buckets.len()
    }

    pub(crate) fn get(
        self: &Arc<Self>,
        client: &Arc<ClientShared<K, V, C>>,
        key: K,
        context: C,
        construct: impl FnOnce(&K) -> (V, usize),
    ) -> CacheEntry<K, V, C> {
        let hash = self.hash_builder.hash_one(&key);
        let idx = self.bucket_index(hash);

        let (ptr, inserted) = {
            let mut shard = self.buckets[idx].lock();
            if let Some(&existing) = shard.get(&key) {
                unsafe { existing.as_ref().ref_count.fetch_add(1, Ordering::Relaxed) };
                (existing, false)
            } else {
                let frame = self.current_frame.load(Ordering::Acquire);
                let item = Box::new(Item::new(hash, key.clone(), context, Arc::new(ConstructionBarrier::new()), frame));
                let ptr = NonNull::from(Box::leak(item));
                shard.insert(key, ptr);
                (ptr, true)
            }
        };

        if inserted {
            self.metrics.record_miss();
            self.metrics.record_insert();
            {
                let mut queue = self.queue.lock();
                unsafe { queue.push_back(ptr) };
            }
            // Counted from the moment the item gains structural membership,
            // not from the moment construction finishes: `detach_and_maybe_free`
            // decrements it for any structurally-removed item, including one
            // a concurrent `cut` evicts while it is still `CONSTRUCTING`, so
            // the two must bracket the same span or `len()` drifts.
            self.item_count.fetch_add(1, Ordering::Relaxed);
            let (value, size) = construct(unsafe { &ptr.as_ref().key });
            self.metrics.record_construct();
            unsafe { ptr.as_ref().publish(value, size) };
            self.total_size.fetch_add(size_contribution(size), Ordering::Relaxed);
            trace!(bucket = idx, "inserted");
        } else {
            self.metrics.record_hit();
            let item = unsafe { ptr.as_ref() };
            if item.is_constructing() {
                item.barrier.wait_until(|| !item.is_constructing());
            }
            self.promote(client, ptr);
        }

        CacheEntry { cache: self.clone(), ptr }
    }

    /// Marks `ptr` as used this frame. The first caller in a frame to
    /// observe the transition queues it for promotion to the tail at the
    /// next `cut`; later callers in the same frame are no-ops.
    fn promote(self: &Arc<Self>, client: &Arc<ClientShared<K, V, C>>, ptr: NonNull<Item<K, V, C>>) {
        let item = unsafe { ptr.as_ref() };
        let current = self.current_frame.load(Ordering::Acquire);
        let prev = item.last_used_frame.swap(current, Ordering::AcqRel);
        if prev != current {
            client.promote.lock().push(ptr);
        }
    }

    pub(crate) fn drain_promotions(&self, client: &Arc<ClientShared<K, V, C>>) {
        let mut promote = client.promote.lock();
        if promote.is_empty() {
            return;
        }
        let mut queue = self.queue.lock();
        for ptr in promote.drain(..) {
            unsafe { queue.move_to_back(ptr) };
        }
    }

    /// Advances to a new frame, draining every registered client's promote
    /// list and then evicting from the queue head while `usage() >
    /// max_bytes`, stopping at the first item used in the just-ended frame.
    ///
    /// Must not be called concurrently with itself: exactly one thread
    /// performs `cut` at a time.
    pub(crate) fn cut(self: &Arc<Self>, max_bytes: usize) {
        let clients: Vec<_> = self.clients.lock().clone();
        for client in &clients {
            self.drain_promotions(client);
        }

        let current_frame = self.current_frame.load(Ordering::Acquire);
        loop {
            if self.total_size.load(Ordering::Relaxed) <= max_bytes {
                break;
            }
            let victim = {
                let mut queue = self.queue.lock();
                let head = match queue.head() {
                    Some(h) => h,
                    None => break,
                };
                let item = unsafe { head.as_ref() };
                if item.last_used_frame.load(Ordering::Acquire) == current_frame {
                    break;
                }
                let bucket_idx = self.bucket_index(item.hash);
                drop(queue);
                let mut bucket = self.buckets[bucket_idx].lock();
                let mut queue = self.queue.lock();
                // Re-confirm head: nothing else removes from the queue
                // while `cut` runs (single-writer contract), so this is
                // just defensive against a future relaxation of that rule.
                if queue.head() != Some(head) {
                    continue;
                }
                unsafe { queue.unlink(head) };
                bucket.remove(&item.key);
                head
            };
            self.detach_and_maybe_free(victim);
        }
        self.current_frame.fetch_add(1, Ordering::Release);
        debug!(frame = current_frame, usage = self.total_size.load(Ordering::Relaxed), "cut");
    }

    /// Structurally removes every item regardless of budget.
    pub(crate) fn empty(self: &Arc<Self>) {
        let all: Vec<NonNull<Item<K, V, C>>> = {
            let mut queue = self.queue.lock();
            let mut items = Vec::with_capacity(queue.len);
            while let Some(head) = queue.head() {
                unsafe { queue.unlink(head) };
                items.push(head);
            }
            items
        };
        for ptr in all {
            let item = unsafe { ptr.as_ref() };
            let bucket_idx = self.bucket_index(item.hash);
            self.buckets[bucket_idx].lock().remove(&item.key);
            self.detach_and_maybe_free(ptr);
        }
    }

    /// `ptr` has just been unlinked from both the bucket chain and the
    /// queue, consuming its structural reference unit. If that was the
    /// last reference, frees it now; otherwise an external `CacheEntry`
    /// still exists and the last one to drop will free it.
    fn detach_and_maybe_free(&self, ptr: NonNull<Item<K, V, C>>) {
        self.metrics.record_evict();
        let size = unsafe { ptr.as_ref().size.load(Ordering::Acquire) };
        if size != CONSTRUCTING {
            self.total_size.fetch_sub(size_contribution(size), Ordering::Relaxed);
            let item = unsafe { ptr.as_ref() };
            self.listener.on_evict(&item.key, item.value(), &item.context);
        }
        self.item_count.fetch_sub(1, Ordering::Relaxed);

        let refs = unsafe { ptr.as_ref().ref_count.fetch_sub(1, Ordering::AcqRel) - 1 };
        if refs == 0 {
            self.free(ptr);
        }
    }

    /// Called by `CacheEntry::drop`, consuming one external-handle
    /// reference unit. The structural unit (if still held) guarantees this
    /// can only reach zero once the item is already unreachable from the
    /// cache's own bucket chain and eviction queue.
    pub(crate) fn release(&self, ptr: NonNull<Item<K, V, C>>) {
        let new_refs = unsafe { ptr.as_ref().ref_count.fetch_sub(1, Ordering::AcqRel) - 1 };
        self.metrics.record_release();
        if new_refs == 0 {
            let key_for_listener = unsafe { &ptr.as_ref().key };
            self.listener.on_release(key_for_listener);
            self.free(ptr);
        }
    }

    /// Runs destructors and frees the allocation. Caller must guarantee
    /// `ptr` is unreachable from the bucket chain, the eviction queue, and
    /// every external handle.
    fn free(&self, ptr: NonNull<Item<K, V, C>>) {
        unsafe {
            let mut boxed = Box::from_raw(ptr.as_ptr());
            boxed.drop_value_in_place();
            drop(boxed);
        }
    }

    pub(crate) fn register_client(self: &Arc<Self>) -> Arc<ClientShared<K, V, C>> {
        let shared = Arc::new(ClientShared::default());
        self.clients.lock().push(shared.clone());
        shared
    }

    pub(crate) fn remove_client(&self, shared: &Arc<ClientShared<K, V, C>>) {
        self.drain_promotions(shared);
        self.clients.lock().retain(|c| !Arc::ptr_eq(c, shared));
    }

    pub(crate) fn usage(&self) -> usize {
        self.total_size.load(Ordering::Relaxed)
    }

    pub(crate) fn len(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    pub(crate) fn stats(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<K: Key, V: Value, C> Drop for CacheInner<K, V, C> {
    fn drop(&mut self) {
        // Outstanding handles keep `CacheInner` alive via their own `Arc`
        // clone, so by the time this runs no external handle exists and
        // every remaining item can be freed unconditionally.
        let queue = self.queue.get_mut();
        while let Some(head) = queue.head() {
            unsafe { queue.unlink(head) };
            unsafe {
                let mut boxed = Box::from_raw(head.as_ptr());
                boxed.drop_value_in_place();
                drop(boxed);
            }
        }
    }
}

/// A concurrent, reference-counted, eviction-aware memo table.
pub struct Cache<K, V, C = ()> {
    inner: Arc<CacheInner<K, V, C>>,
}

impl<K: Key, V: Value, C: Send + Sync + 'static> Cache<K, V, C> {
    pub fn builder() -> CacheBuilder<K, V, C> {
        CacheBuilder::new()
    }

    /// Registers and returns a new client handle on this cache.
    pub fn client(&self) -> Client<K, V, C> {
        let shared = self.inner.register_client();
        Client { cache: self.inner.clone(), shared }
    }

    /// Advances one frame, evicting down to `max_bytes`.
    /// Must not be called from more than one thread concurrently.
    pub fn cut(&self, max_bytes: usize) {
        self.inner.cut(max_bytes);
    }

    /// Drops every item regardless of budget.
    pub fn empty(&self) {
        self.inner.empty();
    }

    pub fn usage(&self) -> usize {
        self.inner.usage()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A point-in-time read of this cache's hit/miss/insert/evict counters.
    pub fn stats(&self) -> MetricsSnapshot {
        self.inner.stats()
    }
}

impl<K: Key, V: Value, C: Send + Sync + 'static> Clone for Cache<K, V, C> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

/// An external, reference-counted handle to one cached value. Cloning
/// increments the refcount; dropping the last clone may free the item if it
/// has already been structurally removed by `cut`/`empty`/shutdown.
pub struct CacheEntry<K, V, C = ()> {
    cache: Arc<CacheInner<K, V, C>>,
    ptr: NonNull<Item<K, V, C>>,
}

impl<K: Key, V: Value, C: Send + Sync + 'static> CacheEntry<K, V, C> {
    pub fn key(&self) -> &K {
        unsafe { &self.ptr.as_ref().key }
    }

    pub fn context(&self) -> &C {
        unsafe { &self.ptr.as_ref().context }
    }

    pub fn size(&self) -> usize {
        unsafe { self.ptr.as_ref().size.load(Ordering::Acquire) }
    }
}

impl<K: Key, V: Value, C: Send + Sync + 'static> Deref for CacheEntry<K, V, C> {
    type Target = V;

    fn deref(&self) -> &V {
        unsafe { self.ptr.as_ref() }.value()
    }
}

// No `K: Key`/`V: Value` bound needed: bumping the refcount and cloning the
// `Arc<CacheInner<..>>` handle touch neither type. Keeping this unconditional
// avoids a bound cycle for key types that embed a `CacheEntry` of their own
// (an outline's font reference, say) — `Key`'s blanket impl wants `K: Clone`,
// which for those keys means `CacheEntry: Clone` too.
impl<K, V, C> Clone for CacheEntry<K, V, C> {
    fn clone(&self) -> Self {
        unsafe { self.ptr.as_ref().ref_count.fetch_add(1, Ordering::Relaxed) };
        Self { cache: self.cache.clone(), ptr: self.ptr }
    }
}

impl<K: Key, V: Value, C: Send + Sync + 'static> Drop for CacheEntry<K, V, C> {
    fn drop(&mut self) {
        self.cache.release(self.ptr);
    }
}

// SAFETY: access to the pointee is mediated entirely by the refcount and
// publication protocol documented on `Item`; `K`/`V`/`C: Send + Sync` are
// already required by the `Key`/`Value` bounds on every public method.
unsafe impl<K: Key, V: Value, C: Send + Sync> Send for CacheEntry<K, V, C> {}
unsafe impl<K: Key, V: Value, C: Send + Sync> Sync for CacheEntry<K, V, C> {}

// Identity, not value, equality: two entries are the same reference iff they
// pin the same item. This is what lets a `CacheEntry` be embedded directly in
// another cache's key (e.g. an outline key's font reference) and still
// satisfy `Key`'s `Eq + Hash` bound.
impl<K, V, C> PartialEq for CacheEntry<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<K, V, C> Eq for CacheEntry<K, V, C> {}

impl<K, V, C> std::hash::Hash for CacheEntry<K, V, C> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ptr.as_ptr().hash(state)
    }
}

// Deliberately does not print the key: doing so would require `K: Debug`,
// which (via the blanket `Key` impl) some keys satisfy only by embedding a
// `CacheEntry` themselves — printing through that bound would make this impl
// depend on its own obligation. The pointer address is enough to tell two
// entries apart in a debug dump; `CacheEntry::key()` is there for callers who
// want the real key and already know its type.
impl<K, V, C> std::fmt::Debug for CacheEntry<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry").field("ptr", &self.ptr).finish()
    }
}
