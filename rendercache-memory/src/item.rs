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

//! The cache item header.
//!
//! A C cache descriptor keeps the key and value in one flat allocation with
//! a header in front; `construct` writes the value bytes in place and the
//! header's `size` field, initially unreadable, is the publication point
//! other threads poll. We keep the flat-allocation idea (one `Box<Item<..>>`
//! per entry) but replace the raw-bytes value area with a `MaybeUninit<V>`
//! written exactly once.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::construct::ConstructionBarrier;

/// Sentinel `size` value meaning "constructor has not published a value
/// yet".
pub const CONSTRUCTING: usize = 0;

/// Fixed per-item bookkeeping overhead folded into the cache's size budget
/// for any item that reports a "real" (not size-1-sentinel) weight. Chosen
/// once and used consistently rather than computed per-monomorphization, so
/// accounting stays comparable across the different concrete cache types.
pub const HEADER_BYTES: usize = 64;

pub(crate) fn size_contribution(reported: usize) -> usize {
    if reported <= 1 {
        1
    } else {
        reported + HEADER_BYTES
    }
}

/// One entry in the table: a key (always valid), a value (valid once
/// `size != CONSTRUCTING`), and the bookkeeping the indexer, the eviction
/// queue and reference counting need.
pub(crate) struct Item<K, V, C> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    value: UnsafeCell<MaybeUninit<V>>,
    pub(crate) context: C,

    /// Published size; `CONSTRUCTING` until the owning `get` call finishes
    /// running its constructor.
    pub(crate) size: AtomicUsize,
    /// Reference count with two kinds of contributors: one unit for the
    /// item's own structural membership (bucket chain + eviction queue,
    /// released together by
    /// `cut`/`empty`/shutdown) and one unit per live external `CacheEntry`.
    /// Because the structural unit persists until explicit removal, the
    /// count cannot reach zero while the item is still reachable from the
    /// cache's own structure — removal and the last external drop race
    /// safely without either side needing to inspect the other's state.
    pub(crate) ref_count: AtomicUsize,
    pub(crate) last_used_frame: AtomicU64,

    /// This item's own construction barrier; waited on by any thread that
    /// observes `size == CONSTRUCTING`.
    pub(crate) barrier: Arc<ConstructionBarrier>,

    /// `true` while this item is linked into the eviction queue. Mutated
    /// only by a thread holding the queue lock.
    pub(crate) in_queue: bool,
    pub(crate) queue_prev: Option<NonNull<Item<K, V, C>>>,
    pub(crate) queue_next: Option<NonNull<Item<K, V, C>>>,
}

impl<K, V, C> Item<K, V, C> {
    pub(crate) fn new(hash: u64, key: K, context: C, barrier: Arc<ConstructionBarrier>, frame: u64) -> Self {
        Self {
            hash,
            key,
            value: UnsafeCell::new(MaybeUninit::uninit()),
            context,
            size: AtomicUsize::new(CONSTRUCTING),
            // One unit for structural membership, one for the handle
            // `get` is about to hand back to its caller.
            ref_count: AtomicUsize::new(2),
            last_used_frame: AtomicU64::new(frame),
            barrier,
            in_queue: false,
            queue_prev: None,
            queue_next: None,
        }
    }

    /// Writes the value and publishes `size` with `Release` ordering,
    /// waking anyone parked on the construction barrier.
    ///
    /// # Safety
    /// Must be called at most once per item, by the thread that won the
    /// insertion race for it.
    pub(crate) unsafe fn publish(&self, value: V, size: usize) {
        debug_assert!(size >= 1, "constructors must report a size >= 1");
        (*self.value.get()).write(value);
        self.size.store(size.max(1), Ordering::Release);
        self.barrier.notify_all();
    }

    /// Reads the value. Caller must have already observed
    /// `size.load(Acquire) != CONSTRUCTING`.
    pub(crate) fn value(&self) -> &V {
        debug_assert_ne!(self.size.load(Ordering::Relaxed), CONSTRUCTING);
        // SAFETY: a non-CONSTRUCTING size was published with Release after
        // the write in `publish`, and the caller paired that with an
        // Acquire load, so the write above happens-before this read.
        unsafe { (*self.value.get()).assume_init_ref() }
    }

    pub(crate) fn is_constructing(&self) -> bool {
        self.size.load(Ordering::Acquire) == CONSTRUCTING
    }

    /// Drops the written value. Only valid once, on an item that is no
    /// longer reachable from the bucket chain, the eviction queue, or any
    /// external handle.
    ///
    /// # Safety
    /// Must not be called on an item whose value was never published, nor
    /// more than once.
    pub(crate) unsafe fn drop_value_in_place(&mut self) {
        if self.size.load(Ordering::Relaxed) != CONSTRUCTING {
            (*self.value.get()).assume_init_drop();
        }
    }
}

// SAFETY: `Item` is only ever touched through `NonNull` pointers shared
// across threads under the discipline described on each field above (bucket
// lock / queue lock / atomics); `K: Send + Sync`, `V: Send + Sync` and
// `C: Send + Sync` are required by the `Key`/`Value` bounds used everywhere
// an `Item` is constructed.
unsafe impl<K: Send, V: Send, C: Send> Send for Item<K, V, C> {}
unsafe impl<K: Sync, V: Sync, C: Sync> Sync for Item<K, V, C> {}
