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

//! The sized shaper-font cache: a text-shaping-engine handle sized to a
//! concrete point size, keyed on a font plus that size. Not named in the
//! distilled cache type list but present in the original implementation
//! (`sized_shaper_font_cache_desc`) as the sixth cache tier; carried over
//! here since a shaping pass needs exactly this memoization (re-scaling a
//! shaper handle for every glyph run would be wasteful) and nothing else in
//! this crate already covers it.

use rendercache_memory::{Cache, Client, CacheEntry};

use crate::fixed::Fixed6;
use crate::font::FontEntry;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaperFontKey {
    pub font: FontEntry,
    pub scale: Fixed6,
}

/// Opaque shaping-engine handle, standing in for whatever a text-shaping
/// library would hand back for a font sized to a point size (the original's
/// `hb_font_t*`).
#[derive(Debug)]
pub struct ShaperFont {
    pub scale: Fixed6,
    pub units_per_em: u16,
}

pub type ShaperFontCache = Cache<ShaperFontKey, ShaperFont, ()>;
pub type ShaperFontClient = Client<ShaperFontKey, ShaperFont, ()>;
pub type ShaperFontEntry = CacheEntry<ShaperFontKey, ShaperFont, ()>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontCache, FontDesc, FontFace};

    #[test]
    fn same_font_and_scale_is_a_hit() {
        let fonts: FontCache = Cache::builder().with_buckets(8).build().unwrap();
        let font_client = fonts.client();
        let font = font_client.get(
            FontDesc { family: "Verdana".into(), weight: 400, italic: false, stretch: 100, vertical: false },
            (),
            |_| (FontFace { family: "Verdana".into(), units_per_em: 2048, ascender: 0, descender: 0, glyph_count: 1 }, 64),
        );

        let shaper_fonts: ShaperFontCache = Cache::builder().with_buckets(8).build().unwrap();
        let client = shaper_fonts.client();
        let key = ShaperFontKey { font: font.clone(), scale: Fixed6::from_f64(18.0) };

        client.get(key.clone(), (), |k| (ShaperFont { scale: k.scale, units_per_em: 2048 }, 8));
        client.get(key, (), |_| panic!("must be a hit"));
        assert_eq!(shaper_fonts.len(), 1);
    }
}
