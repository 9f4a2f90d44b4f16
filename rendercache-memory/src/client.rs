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

//! Client handles.
//!
//! A client is the unit that threads calling `get` acquire. It carries its
//! own construction barrier and its own promote list, so two clients
//! working different keys never contend with each other on anything but
//! the bucket and queue locks the cache itself owns.

use std::ptr::NonNull;
use std::sync::Arc;

use parking_lot::Mutex;
use rendercache_common::code::{Key, Value};
use tracing::trace;

use crate::cache::{CacheEntry, CacheInner};
use crate::item::Item;

/// Each item owns its own construction barrier (see `item.rs`), so the only
/// state a client needs of its own is the promote list: the set of items it
/// has touched this frame and that therefore need moving to the eviction
/// queue's tail at the next `cut`.
pub(crate) struct ClientShared<K, V, C> {
    pub(crate) promote: Mutex<Vec<NonNull<Item<K, V, C>>>>,
}

impl<K, V, C> Default for ClientShared<K, V, C> {
    fn default() -> Self {
        Self { promote: Mutex::new(Vec::new()) }
    }
}

// SAFETY: the promote list is only ever mutated under `promote`'s lock.
unsafe impl<K: Send, V: Send, C: Send> Send for ClientShared<K, V, C> {}
unsafe impl<K: Send, V: Send, C: Send> Sync for ClientShared<K, V, C> {}

/// A per-thread (or per-task) handle into a cache, created with
/// `Cache::client` and destroyed on drop.
pub struct Client<K, V, C = ()> {
    pub(crate) cache: Arc<CacheInner<K, V, C>>,
    pub(crate) shared: Arc<ClientShared<K, V, C>>,
}

impl<K: Key, V: Value, C: Send + Sync + 'static> Client<K, V, C> {
    /// Looks up `key`, running `construct` synchronously on a miss. There is
    /// no async/cooperative scheduler anywhere in the construction path.
    pub fn get(&self, key: K, context: C, construct: impl FnOnce(&K) -> (V, usize)) -> CacheEntry<K, V, C> {
        self.cache.get(&self.shared, key, context, construct)
    }

    /// Drains this client's promote list into the shared eviction queue.
    /// Normally called indirectly by `Cache::cut`; exposed so a caller that
    /// wants deterministic promotion ordering in tests can force it.
    pub fn flush_promotions(&self) {
        self.cache.drain_promotions(&self.shared);
    }
}

impl<K: Key, V: Value, C> Drop for Client<K, V, C> {
    fn drop(&mut self) {
        self.cache.remove_client(&self.shared);
        trace!("client done");
    }
}
