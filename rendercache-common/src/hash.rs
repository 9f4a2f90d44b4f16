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

//! The hash kernel buckets are indexed by.
//!
//! A fast, non-cryptographic 64-bit hash seeded with a fixed constant rather
//! than a per-process random seed, so that hashing stays deterministic across
//! runs (useful for reproducing fuzz failures and for tests that craft
//! colliding keys on purpose). `ahash` is the same class of hash foyer uses
//! (wyhash-family, SIMD-accelerated) but its `RandomState::default()` draws
//! process-random keys; we pin them instead.

use std::hash::BuildHasher;

use ahash::RandomState;

/// Mirrors `ASS_HASH_INIT` from the original implementation: any arbitrary
/// 64-bit constant suffices as a wyhash-class seed.
const SEED_0: u64 = 0xb3e4_6a54_0bd3_6cd4;
const SEED_1: u64 = 0x2545_f491_4f6c_dd1d;
const SEED_2: u64 = 0x9e37_79b9_7f4a_7c15;
const SEED_3: u64 = 0xbf58_476d_1ce4_e5b9;

/// A [`BuildHasher`] that always derives the same hasher state, so two
/// `FixedState`-hashed caches agree on bucket placement across runs.
#[derive(Clone, Debug, Default)]
pub struct FixedState(RandomState);

impl FixedState {
    pub fn new() -> Self {
        Self(RandomState::with_seeds(SEED_0, SEED_1, SEED_2, SEED_3))
    }
}

impl BuildHasher for FixedState {
    type Hasher = <RandomState as BuildHasher>::Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        self.0.build_hasher()
    }
}
