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

//! The outline cache: a tagged key over four variants — glyph outlines,
//! drawing-command outlines, border-expanded outlines (which reference
//! another outline), and plain boxes.
//!
//! `Border` referencing `OutlineKey` through an `OutlineEntry` makes this
//! module self-referential the same way `border_cache_desc` calls back into
//! the outline cache in the original; `ass_cache_inc_ref(s->u.border.outline)`
//! in `outline_key_move` becomes, here, just cloning the embedded
//! `OutlineEntry` as part of cloning the key.

use rendercache_memory::{Cache, Client, CacheEntry};

use crate::fixed::Fixed6;
use crate::font::FontEntry;

/// A filled, possibly unclosed, polygon outline. Stands in for the spline
/// representation a real rasterizer would use.
#[derive(Debug, Clone, Default)]
pub struct Path {
    pub points: Vec<(Fixed6, Fixed6)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutlineKey {
    Glyph { font: FontEntry, glyph_index: u32, scale_x: Fixed6, scale_y: Fixed6 },
    Drawing { text: String, scale: Fixed6 },
    Border { base: OutlineEntry, border_x: Fixed6, border_y: Fixed6 },
    Box { width: Fixed6, height: Fixed6 },
}

/// Fill and border outlines, matching `OutlineHashValue`'s pair (the
/// original stores `outline[0]` fill, `outline[1]` border, in one value).
#[derive(Debug, Default)]
pub struct OutlineValue {
    pub fill: Path,
    pub border: Path,
}

pub type OutlineCache = Cache<OutlineKey, OutlineValue, ()>;
pub type OutlineClient = Client<OutlineKey, OutlineValue, ()>;
pub type OutlineEntry = CacheEntry<OutlineKey, OutlineValue, ()>;
