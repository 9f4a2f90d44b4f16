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

//! Components shared by every `rendercache` crate: the key/value marker
//! traits, the fixed-seed hash kernel, the error type and the metrics
//! counters.

pub mod code;
pub mod error;
pub mod hash;
pub mod metrics;

pub use code::{Key, Value};
pub use error::CacheError;
pub use hash::FixedState;
pub use metrics::Metrics;
