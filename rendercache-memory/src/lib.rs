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

//! The generic concurrent, reference-counted, eviction-aware memo table
//! engine behind `rendercache`.
//!
//! Concrete cache types (font, outline, bitmap, ...) are built on top of
//! [`Cache`] in the `rendercache` facade crate; this crate only knows about
//! keys, values and an opaque per-item context.

mod cache;
mod client;
mod construct;
mod item;
mod listener;
mod queue;

pub use cache::{Cache, CacheBuilder, CacheEntry};
pub use client::Client;
pub use listener::{CacheEventListener, NoopListener};

pub use rendercache_common::error::CacheError;
pub use rendercache_common::metrics::MetricsSnapshot;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    fn small_cache<V: Send + Sync + 'static>() -> Cache<String, V, ()> {
        Cache::builder().with_buckets(8).build().unwrap()
    }

    #[test]
    fn basic_memoization_counts_one_construction_per_key() {
        let cache = small_cache::<u64>();
        let client = cache.client();
        let constructed = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let constructed = constructed.clone();
            let entry = client.get("k".to_string(), (), move |_| {
                constructed.fetch_add(1, Ordering::SeqCst);
                (42, 8)
            });
            assert_eq!(*entry, 42);
        }
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.miss, 1);
        assert_eq!(stats.hit, 4);
    }

    #[test]
    fn hit_and_miss_counters_track_lookups() {
        let cache = small_cache::<u64>();
        let client = cache.client();

        client.get("a".to_string(), (), |_| (1, 8));
        client.get("a".to_string(), (), |_| (1, 8));
        client.get("b".to_string(), (), |_| (2, 8));

        let stats = cache.stats();
        assert_eq!(stats.insert, 2);
        assert_eq!(stats.hit, 1);
    }

    #[test_log::test]
    fn construction_barrier_runs_exactly_once_under_contention() {
        let cache = small_cache::<u64>();
        let constructed = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let constructed = constructed.clone();
                let start = start.clone();
                thread::spawn(move || {
                    let client = cache.client();
                    start.wait();
                    let entry = client.get("shared".to_string(), (), |_| {
                        constructed.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        (7, 8)
                    });
                    assert_eq!(*entry, 7);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn eviction_never_removes_items_used_in_the_current_frame() {
        let cache = small_cache::<u64>();
        let client = cache.client();

        let a = client.get("a".to_string(), (), |_| (1, 16));
        let b = client.get("b".to_string(), (), |_| (2, 16));

        // Both items were touched in frame 0; a `cut` that ends frame 0
        // must not evict either one no matter how far over budget.
        cache.cut(1);
        assert_eq!(cache.len(), 2);
        drop(a);
        drop(b);

        // Touch `b` again (now in frame 1) so it moves to the queue tail;
        // `a` has been idle since frame 0.
        let b2 = client.get("b".to_string(), (), |_| panic!("b must be a hit"));
        client.flush_promotions();
        drop(b2);

        // Ending frame 1 may now reclaim `a`, but must stop before `b`,
        // which was used during the frame this `cut` is closing out.
        cache.cut(1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn dropped_handle_keeps_value_alive_until_structurally_removed() {
        let cache = small_cache::<u64>();
        let client = cache.client();

        let entry = client.get("x".to_string(), (), |_| (9, 8));
        drop(entry);
        assert_eq!(cache.len(), 1, "dropping the handle must not evict a still-cached item");

        let again = client.get("x".to_string(), (), |_| panic!("must be a hit, not reconstructed"));
        assert_eq!(*again, 9);
    }

    #[test]
    fn shutdown_with_outstanding_handle_frees_on_last_drop() {
        let dropped = Arc::new(AtomicUsize::new(0));

        struct Counted(Arc<AtomicUsize>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let cache = Cache::<String, Counted, ()>::builder().with_buckets(8).build().unwrap();
        let client = cache.client();
        let entry = client.get("x".to_string(), (), |_| (Counted(dropped.clone()), 8));

        drop(client);
        drop(cache);
        assert_eq!(dropped.load(Ordering::SeqCst), 0, "outstanding handle keeps the value alive past cache shutdown");
        drop(entry);
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fuzz_random_keys_never_exceed_the_budget_after_a_cut() {
        const BUDGET: usize = 512;

        let cache = small_cache::<u64>();
        let client = cache.client();

        let mut rng = SmallRng::seed_from_u64(114514);
        for i in 0..100_000u64 {
            let key = (rng.next_u64() % 1024).to_string();
            let entry = client.get(key.clone(), (), |_| (1, 1));
            assert_eq!(*entry, 1);
            drop(entry);
            if i % 32 == 0 {
                client.flush_promotions();
                cache.cut(BUDGET);
            }
        }
        client.flush_promotions();
        cache.cut(BUDGET);
        assert!(cache.usage() <= BUDGET);
    }
}
