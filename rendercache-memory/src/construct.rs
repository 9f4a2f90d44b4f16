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

//! The per-item construction barrier.
//!
//! Each item owns one barrier, created fresh when the item is inserted. A
//! reader that hits the item while it is still under construction parks on
//! *that* barrier rather than on a cache-wide one, so waiters on one
//! in-flight construction never serialize unrelated work on other items.
//! Attaching the barrier to the item rather than to the client that created
//! it avoids depending on that client handle still being alive when the
//! construction finishes.

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct ConstructionBarrier {
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl ConstructionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks the calling thread until `ready` observes completion. `ready`
    /// may be called spuriously; it must be cheap and side-effect-free (it
    /// is typically an acquire-load of the item's published size).
    pub fn wait_until(&self, mut ready: impl FnMut() -> bool) {
        let mut guard = self.mutex.lock();
        while !ready() {
            self.condvar.wait(&mut guard);
        }
    }

    /// Wakes every waiter. Must be called after the value the waiters are
    /// polling for has already been published (release-stored).
    pub fn notify_all(&self) {
        // Acquiring the mutex here is required, not incidental: it prevents
        // a waiter from observing `ready() == false`, then us calling
        // `notify_all` before the waiter has actually started waiting on
        // the condvar (the classic lost-wakeup race).
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }
}
