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

//! End-to-end scenarios exercising the generic engine through its public
//! API rather than its internals (`rendercache-memory`'s own unit tests
//! cover the same ground from inside the crate; these exercise it the way a
//! caller of `rendercache` would).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rendercache_memory::{Cache, CacheEntry};

#[test]
fn basic_memoization_counts_misses_and_hits() {
    let cache: Cache<u64, u64, ()> = Cache::builder().with_buckets(8).build().unwrap();
    let client = cache.client();

    for key in [1u64, 2, 1, 3, 2] {
        let entry = client.get(key, (), |k| (*k * 2, 8));
        assert_eq!(*entry, key * 2);
    }

    let stats = cache.stats();
    assert_eq!(stats.miss, 3);
    assert_eq!(stats.hit, 2);
    assert_eq!(cache.usage(), 3 * 8);
}

#[test_log::test]
fn construction_barrier_runs_once_under_eight_way_contention() {
    let cache: Cache<u64, u64, ()> = Cache::builder().with_buckets(8).build().unwrap();
    let constructed = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(8));
    let began = Instant::now();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let constructed = constructed.clone();
            let start = start.clone();
            thread::spawn(move || {
                let client = cache.client();
                start.wait();
                let entry = client.get(1u64, (), |_| {
                    constructed.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(50));
                    (7u64, 8)
                });
                assert_eq!(*entry, 7);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(constructed.load(Ordering::SeqCst), 1, "exactly one thread must run the constructor");
    assert!(
        began.elapsed() < Duration::from_millis(350),
        "waiters must park on the in-flight construction, not each run it serially"
    );
}

#[test]
fn eviction_respects_current_frame() {
    let cache: Cache<&'static str, u64, ()> = Cache::builder().with_buckets(8).build().unwrap();
    let client = cache.client();

    let a = client.get("a", (), |_| (1, 10));
    let b = client.get("b", (), |_| (2, 10));
    let c = client.get("c", (), |_| (3, 10));
    drop(a);
    drop(b);
    drop(c);

    // a, b and c were all touched in frame 0; ending frame 0 must not evict
    // any of them no matter how far over the 15-byte budget that puts us.
    cache.cut(15);
    assert_eq!(cache.usage(), 30);

    // Touch only "a" in the new frame.
    let a = client.get("a", (), |_| panic!("a must be a hit"));
    client.flush_promotions();
    drop(a);

    // Ending frame 1 may reclaim b and c (idle since frame 0), but must stop
    // before a, which was used during the frame this cut closes out.
    cache.cut(15);
    assert_eq!(cache.usage(), 10);
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

    let cache: Cache<&'static str, Counted, ()> = Cache::builder().with_buckets(8).build().unwrap();
    let client = cache.client();
    let entry = client.get("k", (), |_| (Counted(dropped.clone()), 8));

    drop(client);
    drop(cache);
    assert_eq!(dropped.load(Ordering::SeqCst), 0, "an outstanding handle keeps the value alive past cache shutdown");

    drop(entry);
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
}

/// Mirrors the font → outline → bitmap → composite reference chain: an
/// outer cache's key embeds a [`CacheEntry`] from an inner cache, pinning
/// whatever it points to. A `cut` only ever releases the *structural* unit
/// of an item's refcount; as long as another cache's key still holds a
/// cloned entry, the value itself survives the cut and is destructed only
/// once that last reference is dropped too.
#[test]
fn cross_cache_reference_defers_destruction_until_the_pinning_entry_drops() {
    #[derive(Debug)]
    struct Counted(Arc<AtomicUsize>);
    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    struct Pin(CacheEntry<&'static str, Counted, ()>);

    let inner_dropped = Arc::new(AtomicUsize::new(0));
    let inner: Cache<&'static str, Counted, ()> = Cache::builder().with_buckets(8).build().unwrap();
    let inner_client = inner.client();
    let inner_entry = inner_client.get("outline", (), |_| (Counted(inner_dropped.clone()), 8));

    let outer_dropped = Arc::new(AtomicUsize::new(0));
    let outer: Cache<Pin, Counted, ()> = Cache::builder().with_buckets(8).build().unwrap();
    let outer_client = outer.client();
    let outer_entry = outer_client.get(Pin(inner_entry.clone()), (), |_| (Counted(outer_dropped.clone()), 8));

    // Release our own handle; the outer item's embedded `Pin` still holds a
    // clone of it.
    drop(inner_entry);

    // End frame 0 (the item was just inserted, so it was used this frame)
    // and then frame 1 with a zero budget: without the outer cache's pin
    // this would free the value, but it must not, since `outer_entry` is
    // still alive.
    inner.cut(0);
    inner.cut(0);
    assert_eq!(inner_dropped.load(Ordering::SeqCst), 0, "must not be destructed while a cross-cache reference is alive");

    drop(outer_entry);
    assert_eq!(inner_dropped.load(Ordering::SeqCst), 1, "dropping the referencing entry releases the last reference");
    assert_eq!(outer_dropped.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_insertion_with_colliding_keys_has_no_duplicates() {
    const TOTAL: u64 = 10_000;
    const THREADS: u64 = 16;

    // Two buckets, so nearly every one of the 10 000 distinct keys collides
    // into the same shard: this exercises the per-bucket lock under real
    // contention instead of spreading the work across thousands of
    // independent locks.
    let cache: Cache<u64, u64, ()> = Cache::builder().with_buckets(2).build().unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                let client = cache.client();
                let mut key = t;
                while key < TOTAL {
                    let entry = client.get(key, (), |k| (*k, 8));
                    assert_eq!(*entry, key, "a hit or miss must always return a value matching its key");
                    key += THREADS;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(cache.len(), TOTAL as usize, "every distinct key must produce exactly one item");
}

/// Mirrors `foyer-memory`'s own `test_cache_fuzzy`: a long random workload
/// against a small key space, checked only for the invariant a fuzz target
/// can assert without tracking every individual get — usage never exceeds
/// the budget once a cut has run.
#[test_log::test]
fn fuzz_random_workload_stays_within_budget() {
    const BUDGET: usize = 256;

    let cache: Cache<u64, u64, ()> = Cache::builder().with_buckets(4).build().unwrap();
    let client = cache.client();

    let mut rng = SmallRng::seed_from_u64(114514);
    for i in 0..100_000u64 {
        let key = rng.next_u64() % 512;
        let entry = client.get(key, (), |k| (*k, 1));
        assert_eq!(*entry, key);
        drop(entry);
        if i % 64 == 0 {
            client.flush_promotions();
            cache.cut(BUDGET);
        }
    }
    client.flush_promotions();
    cache.cut(BUDGET);
    assert!(cache.usage() <= BUDGET);
}
