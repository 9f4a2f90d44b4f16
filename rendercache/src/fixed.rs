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

//! 26.6 fixed-point scalar, the same convention FreeType (and libass on top
//! of it) uses for glyph transforms. Cache keys need `Eq + Hash`, which
//! floats don't give us honestly; storing the already-quantized fixed-point
//! value sidesteps the question entirely instead of working around it with
//! an `OrderedFloat`-style wrapper.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fixed6(i32);

impl Fixed6 {
    pub const ZERO: Fixed6 = Fixed6(0);

    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn from_f64(v: f64) -> Self {
        Self((v * 64.0).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 64.0
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}
