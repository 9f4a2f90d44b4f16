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

//! Error types shared across the cache crates.
//!
//! The original C interface reports allocation and key-move failure by
//! returning `NULL` and construction-contract violations by `assert`.
//! Idiomatic Rust turns the former into `Result`, and the latter is kept as
//! a `debug_assert!` at the call site (it is a programming error, not a
//! runtime condition) but degrades to a reportable error instead of UB in
//! release builds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The type descriptor's `key_move` equivalent failed — e.g. a string
    /// duplication or transitive reference acquisition could not complete.
    #[error("key move failed: {0}")]
    KeyMove(String),

    /// A constructor reported a size of zero; every cached value must
    /// account for at least one byte.
    #[error("constructor contract violation: {0}")]
    ConstructorContract(String),

    /// A `CacheBuilder` was given a configuration it cannot honor.
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),
}
