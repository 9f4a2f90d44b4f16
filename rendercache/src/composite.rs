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

//! The composite cache: key is a filter spec plus a set of bitmap
//! references, value is the composited bitmap triple.
//!
//! `composite_key_move`/`composite_key_destruct` walk `k->bitmaps[]`
//! inc/dec-refing each one by hand; here `Vec<BitmapEntry>` gets the same
//! behavior from `Clone`/`Drop` derived on the key.

use rendercache_memory::{Cache, Client, CacheEntry};

use crate::bitmap::{Bitmap, BitmapEntry};
use crate::fixed::Fixed6;

/// Blur radius and shadow offset, the parameters a compositing pass applies
/// on top of the rasterized bitmaps (`FilterHashKey` in the original).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    pub blur_x: Fixed6,
    pub blur_y: Fixed6,
    pub shadow_x: Fixed6,
    pub shadow_y: Fixed6,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub filter: FilterSpec,
    pub bitmaps: Vec<BitmapEntry>,
}

/// Base (fill), outline (border) and shadow bitmaps composited together,
/// matching `CompositeHashValue`'s `bm`/`bm_o`/`bm_s` triple.
#[derive(Debug, Clone, Default)]
pub struct CompositeValue {
    pub base: Bitmap,
    pub outline: Bitmap,
    pub shadow: Bitmap,
}

pub type CompositeCache = Cache<CompositeKey, CompositeValue, ()>;
pub type CompositeClient = Client<CompositeKey, CompositeValue, ()>;
pub type CompositeEntry = CacheEntry<CompositeKey, CompositeValue, ()>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{BitmapCache, BitmapKey};
    use crate::outline::{OutlineCache, OutlineKey, OutlineValue};

    #[test]
    fn compositing_the_same_bitmap_set_is_a_hit() {
        let outlines: OutlineCache = Cache::builder().with_buckets(8).build().unwrap();
        let outline_client = outlines.client();
        let outline = outline_client.get(
            OutlineKey::Box { width: Fixed6::from_f64(4.0), height: Fixed6::from_f64(4.0) },
            (),
            |_| (OutlineValue::default(), 16),
        );

        let bitmaps: BitmapCache = Cache::builder().with_buckets(8).build().unwrap();
        let bitmap_client = bitmaps.client();
        let bitmap = bitmap_client.get(
            BitmapKey { outline: outline.clone(), scale_x: Fixed6::from_f64(1.0), scale_y: Fixed6::from_f64(1.0), shift_x: Fixed6::ZERO, shift_y: Fixed6::ZERO },
            (),
            |_| (Bitmap { width: 4, height: 4, stride: 4, left: 0, top: 0, data: vec![0; 16] }, 16),
        );

        let composites: CompositeCache = Cache::builder().with_buckets(8).build().unwrap();
        let client = composites.client();
        let filter = FilterSpec { blur_x: Fixed6::ZERO, blur_y: Fixed6::ZERO, shadow_x: Fixed6::ZERO, shadow_y: Fixed6::ZERO };

        let key = CompositeKey { filter, bitmaps: vec![bitmap.clone()] };
        client.get(key.clone(), (), |_| (CompositeValue::default(), 48));
        client.get(key, (), |_| panic!("must be a hit"));

        assert_eq!(composites.len(), 1);
        drop(bitmap);
        drop(outline);
    }
}
