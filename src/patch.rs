//! Eager in-memory image store with random-crop access.

use crate::types::{DatasetError, DatasetResult, TextureImage};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed collection of decoded images that serves a freshly positioned crop
/// on every access.
///
/// All decoding happens at construction; `get` only slices the stored
/// tensors, so concurrent readers need no locking. Every `get` draws fresh
/// offsets, so repeated access to the same index is not idempotent.
#[derive(Debug)]
pub struct PatchSampler {
    images: Vec<TextureImage>,
    patch_height: u32,
    patch_width: u32,
}

impl PatchSampler {
    /// Decode every file directly under `root` (non-recursive, sorted by
    /// name). Fails fast on the first undecodable file or any image smaller
    /// than `patch_size = (height, width)`.
    pub fn new(root: &Path, patch_size: (u32, u32)) -> DatasetResult<Self> {
        let (patch_height, patch_width) = patch_size;
        let entries = fs::read_dir(root).map_err(|e| DatasetError::Io {
            path: root.to_path_buf(),
            source: e,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            let img = image::open(&path)
                .map_err(|e| DatasetError::Image {
                    path: path.clone(),
                    source: e,
                })?
                .to_rgb8();
            let texture = TextureImage::from_rgb8(&img);
            if texture.width < patch_width || texture.height < patch_height {
                return Err(DatasetError::PatchTooSmall {
                    path,
                    width: texture.width,
                    height: texture.height,
                    patch_height,
                    patch_width,
                });
            }
            images.push(texture);
        }
        println!(
            "[patch] loaded {} images from {}",
            images.len(),
            root.display()
        );
        Ok(Self {
            images,
            patch_height,
            patch_width,
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Configured `(height, width)` of every returned crop.
    pub fn patch_size(&self) -> (u32, u32) {
        (self.patch_height, self.patch_width)
    }

    /// Crop the image at `index` at a fresh uniformly random offset, using
    /// the thread-local generator. Use [`get_with_rng`](Self::get_with_rng)
    /// to give parallel workers independent streams.
    pub fn get(&self, index: usize) -> DatasetResult<TextureImage> {
        self.get_with_rng(index, &mut rand::rng())
    }

    pub fn get_with_rng(
        &self,
        index: usize,
        rng: &mut dyn rand::RngCore,
    ) -> DatasetResult<TextureImage> {
        let len = self.images.len();
        let image = self
            .images
            .get(index)
            .ok_or(DatasetError::OutOfRange { index, len })?;
        let max_x = image.width - self.patch_width;
        let max_y = image.height - self.patch_height;
        let x = if max_x == 0 {
            0
        } else {
            rng.random_range(0..max_x)
        };
        let y = if max_y == 0 {
            0
        } else {
            rng.random_range(0..max_y)
        };
        Ok(image.crop(x, y, self.patch_width, self.patch_height))
    }
}
