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

//! Concrete caches for a subtitle rendering pipeline, built on the generic
//! engine in `rendercache-memory`.
//!
//! Six caches form a reference DAG: `composite` pins `bitmap`s, `bitmap` pins
//! an `outline`, `outline` (for glyphs and borders) pins a `font` or another
//! `outline`, and `glyph_metrics`/`shaper_font` each pin a `font`. Every
//! cross-cache reference is an embedded [`rendercache_memory::CacheEntry`];
//! its `Clone`/`Drop` impls are the `inc_ref`/`dec_ref` calls the original
//! type descriptors made by hand.
//!
//! Fixed-point 26.6 integers (`Fixed6`) are used everywhere a font/outline
//! transform would naturally be a float, so the transforms can live in a
//! `Hash + Eq` cache key without the usual float-key pitfalls.

mod bitmap;
mod composite;
mod fixed;
mod font;
mod glyph_metrics;
mod outline;
mod shaper_font;

pub use bitmap::{Bitmap, BitmapCache, BitmapClient, BitmapEntry, BitmapKey};
pub use composite::{CompositeCache, CompositeClient, CompositeEntry, CompositeKey, CompositeValue, FilterSpec};
pub use fixed::Fixed6;
pub use font::{FontCache, FontClient, FontDesc, FontEntry, FontFace};
pub use glyph_metrics::{GlyphMetrics, GlyphMetricsCache, GlyphMetricsClient, GlyphMetricsEntry, GlyphMetricsKey};
pub use outline::{OutlineCache, OutlineClient, OutlineEntry, OutlineKey, OutlineValue, Path};
pub use shaper_font::{ShaperFont, ShaperFontCache, ShaperFontClient, ShaperFontEntry, ShaperFontKey};

pub use rendercache_common::error::CacheError;
pub use rendercache_common::metrics::MetricsSnapshot;
pub use rendercache_memory::{CacheEventListener, NoopListener};

/// The six caches a renderer needs, wired together with a shared bucket
/// count and built in dependency order. Splitting the per-frame byte budget
/// across tiers is a renderer policy, not this crate's concern.
pub struct RenderCaches {
    pub font: FontCache,
    pub outline: OutlineCache,
    pub glyph_metrics: GlyphMetricsCache,
    pub shaper_font: ShaperFontCache,
    pub bitmap: BitmapCache,
    pub composite: CompositeCache,
}

impl RenderCaches {
    pub fn new(buckets: usize) -> Result<Self, CacheError> {
        Ok(Self {
            font: FontCache::builder().with_buckets(buckets).build()?,
            outline: OutlineCache::builder().with_buckets(buckets).build()?,
            glyph_metrics: GlyphMetricsCache::builder().with_buckets(buckets).build()?,
            shaper_font: ShaperFontCache::builder().with_buckets(buckets).build()?,
            bitmap: BitmapCache::builder().with_buckets(buckets).build()?,
            composite: CompositeCache::builder().with_buckets(buckets).build()?,
        })
    }

    /// Ends the current frame on every tier. The caller must not call this
    /// concurrently with itself, same as each tier's own `cut`.
    ///
    /// Tiers are cut in dependency order, composite first: evicting a
    /// composite can only ever drop its own reference on a bitmap, never the
    /// other way around, so cutting downstream-to-upstream lets a tier's
    /// `usage()` already reflect everything the previous tier just released.
    pub fn cut(&self, budgets: &RenderCacheBudgets) {
        self.composite.cut(budgets.composite);
        self.bitmap.cut(budgets.bitmap);
        self.shaper_font.cut(budgets.shaper_font);
        self.glyph_metrics.cut(budgets.glyph_metrics);
        self.outline.cut(budgets.outline);
        self.font.cut(budgets.font);
        tracing::debug!("render caches cut");
    }
}

/// Per-tier byte budgets for one [`RenderCaches::cut`] call.
#[derive(Debug, Clone, Copy)]
pub struct RenderCacheBudgets {
    pub font: usize,
    pub outline: usize,
    pub glyph_metrics: usize,
    pub shaper_font: usize,
    pub bitmap: usize,
    pub composite: usize,
}
