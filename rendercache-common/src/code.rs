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

use std::fmt::Debug;
use std::hash::Hash;

/// A cacheable key: hashable, comparable, cheap to clone, and carrying
/// whatever transitive cross-cache references the type descriptor needs to
/// keep alive.
pub trait Key: Clone + Eq + Hash + Send + Sync + Debug + 'static {}
impl<T> Key for T where T: Clone + Eq + Hash + Send + Sync + Debug + 'static {}

/// A cacheable value. Values are never cloned by the engine itself; they are
/// shared exclusively through `CacheEntry` reference counting.
pub trait Value: Send + Sync + Debug + 'static {}
impl<T> Value for T where T: Send + Sync + Debug + 'static {}
