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

//! The frame-aware eviction queue.
//!
//! A single intrusive doubly-linked list, tail = most recently promoted,
//! head = next eviction candidate. Guarded by one lock, same as the
//! original's `cache->queue_first`/`queue_last`, but here the critical
//! section is just pointer surgery rather than the whole cut pass.

use std::ptr::NonNull;

use crate::item::Item;

pub(crate) struct Queue<K, V, C> {
    head: Option<NonNull<Item<K, V, C>>>,
    tail: Option<NonNull<Item<K, V, C>>>,
    pub(crate) len: usize,
}

impl<K, V, C> Default for Queue<K, V, C> {
    fn default() -> Self {
        Self { head: None, tail: None, len: 0 }
    }
}

impl<K, V, C> Queue<K, V, C> {
    pub(crate) fn head(&self) -> Option<NonNull<Item<K, V, C>>> {
        self.head
    }

    /// Links `ptr` at the tail. `ptr` must not already be linked.
    ///
    /// # Safety
    /// `ptr` must be a valid, exclusively-owned-for-linkage pointer.
    pub(crate) unsafe fn push_back(&mut self, mut ptr: NonNull<Item<K, V, C>>) {
        let item = ptr.as_mut();
        debug_assert!(!item.in_queue);
        item.queue_prev = self.tail;
        item.queue_next = None;
        item.in_queue = true;
        match self.tail {
            Some(mut old_tail) => old_tail.as_mut().queue_next = Some(ptr),
            None => self.head = Some(ptr),
        }
        self.tail = Some(ptr);
        self.len += 1;
    }

    /// Unlinks `ptr` from wherever it currently sits.
    ///
    /// # Safety
    /// `ptr` must currently be linked into this queue.
    pub(crate) unsafe fn unlink(&mut self, mut ptr: NonNull<Item<K, V, C>>) {
        let item = ptr.as_mut();
        debug_assert!(item.in_queue);
        match item.queue_prev {
            Some(mut prev) => prev.as_mut().queue_next = item.queue_next,
            None => self.head = item.queue_next,
        }
        match item.queue_next {
            Some(mut next) => next.as_mut().queue_prev = item.queue_prev,
            None => self.tail = item.queue_prev,
        }
        item.queue_prev = None;
        item.queue_next = None;
        item.in_queue = false;
        self.len -= 1;
    }

    /// Moves `ptr` to the tail, a no-op if it is already there.
    ///
    /// # Safety
    /// `ptr` must currently be linked into this queue.
    pub(crate) unsafe fn move_to_back(&mut self, ptr: NonNull<Item<K, V, C>>) {
        if self.tail == Some(ptr) {
            return;
        }
        self.unlink(ptr);
        self.push_back(ptr);
    }
}
