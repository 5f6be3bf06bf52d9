// Copyright (C) 2024 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Dominant icon color.
//!
//! The launcher tints each slot's splash screen with the most prominent hue
//! of the app icon. Nearly transparent, grey, and dark pixels are ignored,
//! the remaining pixels are grouped into hue buckets, and the average color of
//! the fullest bucket is returned.

use core::fmt;

use super::Icon;

const HUE_BUCKETS: usize = 36;
const MIN_ALPHA: u8 = 128;
const MIN_SATURATION: f32 = 0.35;
const MIN_VALUE: f32 = 0.35;

/// Failure to extract a dominant color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorError {
    /// The icon has no pixels.
    EmptyImage,
    /// No pixel is opaque and colorful enough.
    NoColoredPixels,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColorError::EmptyImage => write!(f, "icon has no pixels"),
            ColorError::NoColoredPixels => write!(f, "icon has no colored pixels"),
        }
    }
}

impl std::error::Error for ColorError {}

#[derive(Clone, Copy, Default)]
struct Bucket {
    count: u64,
    red: u64,
    green: u64,
    blue: u64,
}

/// Returns the dominant color of `icon` packed as `0xAARRGGBB` with full
/// alpha.
///
/// Equal buckets resolve to the lowest hue, so the result only depends on
/// the pixels.
///
/// # Errors
///
/// Returns an error if the icon is empty or has no qualifying pixel.
pub fn dominant_color(icon: &Icon) -> Result<i32, ColorError> {
    if icon.width() == 0 || icon.height() == 0 {
        return Err(ColorError::EmptyImage);
    }

    let mut buckets = [Bucket::default(); HUE_BUCKETS];
    for [r, g, b, a] in icon.pixels() {
        if a < MIN_ALPHA {
            continue;
        }
        let (hue, saturation, value) = rgb_to_hsv(r, g, b);
        if saturation <= MIN_SATURATION || value <= MIN_VALUE {
            continue;
        }
        let index = ((hue / 360.0 * HUE_BUCKETS as f32) as usize).min(HUE_BUCKETS - 1);
        let bucket = &mut buckets[index];
        bucket.count += 1;
        bucket.red += r as u64;
        bucket.green += g as u64;
        bucket.blue += b as u64;
    }

    let mut best = &buckets[0];
    for bucket in &buckets[1..] {
        if bucket.count > best.count {
            best = bucket;
        }
    }
    if best.count == 0 {
        return Err(ColorError::NoColoredPixels);
    }

    let red = (best.red / best.count) as u32;
    let green = (best.green / best.count) as u32;
    let blue = (best.blue / best.count) as u32;
    Ok((0xFF00_0000 | red << 16 | green << 8 | blue) as i32)
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };
    (hue, saturation, max)
}
