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

//! The glyph metrics cache: key references a font and carries a glyph id +
//! transform, value is a metrics record.

use rendercache_memory::{Cache, Client, CacheEntry};

use crate::fixed::Fixed6;
use crate::font::FontEntry;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphMetricsKey {
    pub font: FontEntry,
    pub glyph_index: u32,
    pub scale_x: Fixed6,
    pub scale_y: Fixed6,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphMetrics {
    pub advance_x: Fixed6,
    pub advance_y: Fixed6,
    pub bearing_x: Fixed6,
    pub bearing_y: Fixed6,
    pub width: Fixed6,
    pub height: Fixed6,
}

pub type GlyphMetricsCache = Cache<GlyphMetricsKey, GlyphMetrics, ()>;
pub type GlyphMetricsClient = Client<GlyphMetricsKey, GlyphMetrics, ()>;
pub type GlyphMetricsEntry = CacheEntry<GlyphMetricsKey, GlyphMetrics, ()>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontCache, FontDesc, FontFace};

    #[test]
    fn distinct_transforms_produce_distinct_entries() {
        let fonts: FontCache = Cache::builder().with_buckets(8).build().unwrap();
        let font_client = fonts.client();
        let font = font_client.get(
            FontDesc { family: "DejaVu Sans".into(), weight: 400, italic: false, stretch: 100, vertical: false },
            (),
            |_| (FontFace { family: "DejaVu Sans".into(), units_per_em: 2048, ascender: 0, descender: 0, glyph_count: 1 }, 64),
        );

        let metrics: GlyphMetricsCache = Cache::builder().with_buckets(8).build().unwrap();
        let client = metrics.client();

        let a = client.get(
            GlyphMetricsKey { font: font.clone(), glyph_index: 1, scale_x: Fixed6::from_f64(1.0), scale_y: Fixed6::from_f64(1.0) },
            (),
            |_| (GlyphMetrics::default(), 4),
        );
        let b = client.get(
            GlyphMetricsKey { font: font.clone(), glyph_index: 1, scale_x: Fixed6::from_f64(2.0), scale_y: Fixed6::from_f64(2.0) },
            (),
            |_| (GlyphMetrics::default(), 4),
        );

        assert_eq!(metrics.len(), 2);
        drop(a);
        drop(b);
        drop(font);
    }
}
