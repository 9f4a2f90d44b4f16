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

//! The font cache: key is a font descriptor, value is an opened font face.
//!
//! The original's `font_key_move` exists only to deep-copy the family
//! string so a transient on-stack key can be abandoned safely; here the key
//! is owned outright by `get`'s caller and moved into the item on a miss, so
//! the copy `font_key_move` worked around falls out of `String`'s own
//! ownership rules for free.

use rendercache_memory::{Cache, Client, CacheEntry};

/// Identifies a font the way a renderer's font selector would: by family
/// name plus the style axes that affect face selection (not rendering).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontDesc {
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    pub stretch: u16,
    pub vertical: bool,
}

/// An opened face. Stands in for whatever FreeType/HarfBuzz handle a real
/// renderer would keep alive here; this crate only needs it to be a value
/// the engine can store and hand out by reference.
#[derive(Debug)]
pub struct FontFace {
    pub family: String,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub glyph_count: u32,
}

pub type FontCache = Cache<FontDesc, FontFace, ()>;
pub type FontClient = Client<FontDesc, FontFace, ()>;
pub type FontEntry = CacheEntry<FontDesc, FontFace, ()>;
