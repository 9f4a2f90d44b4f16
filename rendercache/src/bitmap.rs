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

//! The bitmap cache: key references an outline and carries a raster
//! transform, value is a rendered bitmap.

use rendercache_memory::{Cache, Client, CacheEntry};

use crate::fixed::Fixed6;
use crate::outline::OutlineEntry;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitmapKey {
    pub outline: OutlineEntry,
    pub scale_x: Fixed6,
    pub scale_y: Fixed6,
    pub shift_x: Fixed6,
    pub shift_y: Fixed6,
}

/// An 8-bit alpha-coverage raster, the unit the compositing tier combines.
#[derive(Debug, Clone, Default)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub left: i32,
    pub top: i32,
    pub data: Vec<u8>,
}

pub type BitmapCache = Cache<BitmapKey, Bitmap, ()>;
pub type BitmapClient = Client<BitmapKey, Bitmap, ()>;
pub type BitmapEntry = CacheEntry<BitmapKey, Bitmap, ()>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{OutlineCache, OutlineKey, OutlineValue};

    #[test]
    fn rasterizing_at_two_shifts_yields_two_entries() {
        let outlines: OutlineCache = Cache::builder().with_buckets(8).build().unwrap();
        let outline_client = outlines.client();
        let outline = outline_client.get(
            OutlineKey::Box { width: Fixed6::from_f64(8.0), height: Fixed6::from_f64(8.0) },
            (),
            |_| (OutlineValue::default(), 16),
        );

        let bitmaps: BitmapCache = Cache::builder().with_buckets(8).build().unwrap();
        let client = bitmaps.client();

        let a = client.get(
            BitmapKey { outline: outline.clone(), scale_x: Fixed6::from_f64(1.0), scale_y: Fixed6::from_f64(1.0), shift_x: Fixed6::ZERO, shift_y: Fixed6::ZERO },
            (),
            |_| (Bitmap { width: 8, height: 8, stride: 8, left: 0, top: 0, data: vec![0; 64] }, 64),
        );
        let b = client.get(
            BitmapKey { outline: outline.clone(), scale_x: Fixed6::from_f64(1.0), scale_y: Fixed6::from_f64(1.0), shift_x: Fixed6::from_f64(0.5), shift_y: Fixed6::ZERO },
            (),
            |_| (Bitmap { width: 8, height: 8, stride: 8, left: 0, top: 0, data: vec![0; 64] }, 64),
        );

        assert_eq!(bitmaps.len(), 2);
        drop(a);
        drop(b);
        drop(outline);
    }
}
