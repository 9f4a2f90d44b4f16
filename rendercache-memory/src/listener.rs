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

//! Optional eviction/release observers, ambient to the spec but carried
//! over from the teacher's `event.rs` so callers can hook logging or
//! metrics into structural lifecycle events without reaching into the
//! engine's internals.

/// Invoked on item lifecycle transitions that cross the cache/value
/// boundary. Default methods are no-ops; implementors only override what
/// they care about.
pub trait CacheEventListener<K, V, C>: Send + Sync {
    /// An item was structurally removed from the cache (evicted by `cut`,
    /// or torn down by `empty`/shutdown) while still holding a value.
    fn on_evict(&self, _key: &K, _value: &V, _context: &C) {}

    /// The last external handle to an already-detached item was dropped,
    /// triggering its actual deallocation.
    fn on_release(&self, _key: &K) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl<K, V, C> CacheEventListener<K, V, C> for NoopListener {}
