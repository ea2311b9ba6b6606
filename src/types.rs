//! Core types, error definitions, and data structures for pbr_dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Maximum representable sample value for 8-bit image channels. Pixel
/// intensities are divided by this to land in [0, 1].
pub const U8_PIXEL_MAX: f32 = 255.0;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("image decode error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no texture kinds requested")]
    EmptyKindSet,
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error(
        "image {path} is {width}x{height}, smaller than requested patch {patch_width}x{patch_height}"
    )]
    PatchTooSmall {
        path: PathBuf,
        width: u32,
        height: u32,
        patch_height: u32,
        patch_width: u32,
    },
}

/// The texture maps that make up a PBR material bundle.
///
/// Files on disk follow `<material>-<suffix>.<ext>` with the suffixes
/// returned by [`TextureKind::file_suffix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureKind {
    Albedo,
    Normal,
    Metallic,
    Roughness,
    #[serde(rename = "ao")]
    AmbientOcclusion,
}

impl TextureKind {
    pub const ALL: [TextureKind; 5] = [
        TextureKind::Albedo,
        TextureKind::Normal,
        TextureKind::Metallic,
        TextureKind::Roughness,
        TextureKind::AmbientOcclusion,
    ];

    /// File-name suffix used by the on-disk naming convention.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            TextureKind::Albedo => "albedo",
            TextureKind::Normal => "normal",
            TextureKind::Metallic => "metallic",
            TextureKind::Roughness => "roughness",
            TextureKind::AmbientOcclusion => "ao",
        }
    }
}

/// Which side of the train/test partition a catalog serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

/// An owned image in channel-first (CHW) layout, normalized to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    /// Pixel data laid out plane-by-plane: `data[c * h * w + y * w + x]`.
    pub data: Vec<f32>,
    pub channels: usize,
    pub height: u32,
    pub width: u32,
}

impl TextureImage {
    /// Convert a decoded 8-bit RGB image into a normalized CHW tensor.
    pub fn from_rgb8(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let plane = (width * height) as usize;
        let mut data = vec![0.0f32; plane * 3];
        for (x, y, pixel) in img.enumerate_pixels() {
            let base = (y * width + x) as usize;
            data[base] = pixel[0] as f32 / U8_PIXEL_MAX;
            data[plane + base] = pixel[1] as f32 / U8_PIXEL_MAX;
            data[2 * plane + base] = pixel[2] as f32 / U8_PIXEL_MAX;
        }
        Self {
            data,
            channels: 3,
            height,
            width,
        }
    }

    /// Keep only the first `channels` planes. CHW layout makes this a
    /// truncation of the backing buffer.
    pub fn truncate_channels(mut self, channels: usize) -> Self {
        let keep = channels.min(self.channels);
        let plane = (self.width * self.height) as usize;
        self.data.truncate(keep * plane);
        self.channels = keep;
        self
    }

    /// Copy out a `(channels, height, width)` rectangle whose top-left
    /// pixel is `(x, y)`. The caller guarantees the rectangle fits.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let src_plane = (self.width * self.height) as usize;
        let mut data = Vec::with_capacity(self.channels * (width * height) as usize);
        for c in 0..self.channels {
            let plane = c * src_plane;
            for row in y..y + height {
                let start = plane + (row * self.width + x) as usize;
                data.extend_from_slice(&self.data[start..start + width as usize]);
            }
        }
        Self {
            data,
            channels: self.channels,
            height,
            width,
        }
    }

    /// Sample one value; useful for assertions on known pixels.
    pub fn value_at(&self, channel: usize, x: u32, y: u32) -> f32 {
        let plane = (self.width * self.height) as usize;
        self.data[channel * plane + (y * self.width + x) as usize]
    }
}

/// One decoded material record: a normalized CHW image per requested
/// texture kind. Kinds that were not requested are absent.
#[derive(Debug, Clone)]
pub struct MaterialSample {
    pub material: String,
    pub maps: BTreeMap<TextureKind, TextureImage>,
}
