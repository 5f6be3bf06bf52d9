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

//! Launcher icons.

use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::RgbaImage;

const DATA_URI_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// A decoded RGBA icon.
#[derive(Clone, Debug, PartialEq)]
pub struct Icon {
    image: RgbaImage,
}

impl Icon {
    /// Builds an icon from raw RGBA pixels, four bytes per pixel in row order.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::Dimensions`] if `pixels` does not hold exactly
    /// `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, IconError> {
        match RgbaImage::from_raw(width, height, pixels) {
            Some(image) if image.len() == (width as usize) * (height as usize) * 4 => {
                Ok(Self { image })
            }
            _ => Err(IconError::Dimensions(width, height)),
        }
    }

    /// Builds an icon of a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        }
    }

    /// Decodes PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, IconError> {
        let image = image::load_from_memory(bytes).map_err(IconError::Image)?;
        Ok(Self {
            image: image.to_rgba8(),
        })
    }

    /// Decodes a base64 `data:` URI such as `data:image/png;base64,iVBOR...`.
    pub fn from_data_uri(uri: &str) -> Result<Self, IconError> {
        let rest = uri
            .strip_prefix(DATA_URI_SCHEME)
            .ok_or(IconError::InvalidDataUri)?;
        let (header, data) = rest.split_once(',').ok_or(IconError::InvalidDataUri)?;
        if !header.ends_with(BASE64_MARKER) {
            return Err(IconError::InvalidDataUri);
        }
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(IconError::Base64)?;
        Self::decode(&bytes)
    }

    /// Returns `true` if `uri` looks like a `data:` URI.
    pub fn is_data_uri(uri: &str) -> bool {
        uri.starts_with(DATA_URI_SCHEME)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub(crate) fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.image.pixels().map(|p| p.0)
    }
}

/// Failure to build an [`Icon`].
#[derive(Debug)]
pub enum IconError {
    /// The pixel buffer does not match the given width and height.
    Dimensions(u32, u32),
    /// The URI is not a base64 `data:` URI.
    InvalidDataUri,
    /// The `data:` URI payload is not valid base64.
    Base64(base64::DecodeError),
    /// The bytes are not a supported image.
    Image(image::ImageError),
}

impl fmt::Display for IconError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IconError::Dimensions(w, h) => write!(f, "pixel buffer does not match {}x{}", w, h),
            IconError::InvalidDataUri => write!(f, "not a base64 data uri"),
            IconError::Base64(e) => write!(f, "invalid base64: {}", e),
            IconError::Image(e) => write!(f, "cannot decode image: {}", e),
        }
    }
}

impl std::error::Error for IconError {}
