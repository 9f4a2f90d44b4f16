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

//! Observational counters returned by `Cache::stats`.
//!
//! Fields are plain `AtomicU64`s bumped with `Relaxed` ordering: callers only
//! need a point-in-time read, not a value consistent across fields, so there
//! is no reason to pay for anything stronger.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    pub hit: AtomicU64,
    pub miss: AtomicU64,
    pub insert: AtomicU64,
    pub replace: AtomicU64,
    pub evict: AtomicU64,
    pub release: AtomicU64,
    pub construct: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hit.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("rendercache_hits_total").increment(1);
    }

    pub fn record_miss(&self) {
        self.miss.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("rendercache_misses_total").increment(1);
    }

    pub fn record_insert(&self) {
        self.insert.fetch_add(1, Ordering::Relaxed);
        metrics::gauge!("rendercache_items").increment(1.0);
    }

    pub fn record_replace(&self) {
        self.replace.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evict(&self) {
        self.evict.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("rendercache_evictions_total").increment(1);
    }

    pub fn record_release(&self) {
        self.release.fetch_add(1, Ordering::Relaxed);
        metrics::gauge!("rendercache_items").decrement(1.0);
    }

    pub fn record_construct(&self) {
        self.construct.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hit: self.hit.load(Ordering::Relaxed),
            miss: self.miss.load(Ordering::Relaxed),
            insert: self.insert.load(Ordering::Relaxed),
            replace: self.replace.load(Ordering::Relaxed),
            evict: self.evict.load(Ordering::Relaxed),
            release: self.release.load(Ordering::Relaxed),
            construct: self.construct.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time, non-atomic read of [`Metrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub hit: u64,
    pub miss: u64,
    pub insert: u64,
    pub replace: u64,
    pub evict: u64,
    pub release: u64,
    pub construct: u64,
}
