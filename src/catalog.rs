//! Material bundle discovery, deterministic partitioning, and sample decoding.

use crate::types::{DatasetError, DatasetResult, MaterialSample, Split, TextureImage, TextureKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Seed for the partition shuffle. Constant so the train/test membership of
/// every material is identical across runs and processes.
pub const SPLIT_SEED: u64 = 42;

/// Fraction of complete bundles assigned to the training split.
pub const TRAIN_FRACTION: f32 = 0.75;

/// Extensions probed when resolving `<material>-<kind>.<ext>`, first hit wins.
const TEXTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub(crate) struct ScannedMaterial {
    pub(crate) name: String,
    pub(crate) resolved: BTreeMap<TextureKind, PathBuf>,
    pub(crate) missing: Vec<TextureKind>,
}

impl ScannedMaterial {
    pub(crate) fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Scan the immediate subdirectories of `root` as candidate materials,
/// resolving each requested kind by file existence only. No pixel content
/// is decoded here.
pub(crate) fn scan_root(
    root: &Path,
    requested: &[TextureKind],
) -> DatasetResult<Vec<ScannedMaterial>> {
    let entries = fs::read_dir(root).map_err(|e| DatasetError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        if !entry.path().is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        names.push(name);
    }
    // read_dir order is platform-dependent; sort for a stable enumeration.
    names.sort();

    let mut scanned = Vec::with_capacity(names.len());
    for name in names {
        let folder = root.join(&name);
        let mut resolved = BTreeMap::new();
        let mut missing = Vec::new();
        for &kind in requested {
            match resolve_texture(&folder, &name, kind) {
                Some(path) => {
                    resolved.insert(kind, path);
                }
                None => missing.push(kind),
            }
        }
        scanned.push(ScannedMaterial {
            name,
            resolved,
            missing,
        });
    }
    Ok(scanned)
}

fn resolve_texture(folder: &Path, material: &str, kind: TextureKind) -> Option<PathBuf> {
    TEXTURE_EXTENSIONS
        .iter()
        .map(|ext| folder.join(format!("{material}-{}.{ext}", kind.file_suffix())))
        .find(|path| path.exists())
}

pub(crate) fn dedup_kinds(requested: &[TextureKind]) -> Vec<TextureKind> {
    let mut kinds: Vec<TextureKind> = Vec::with_capacity(requested.len());
    for &kind in requested {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds
}

/// Indexable view over one split of the complete material bundles under a
/// root directory.
///
/// Construction only tests file existence; decoding happens lazily per
/// [`get`](MaterialsCatalog::get) call. Materials missing any requested kind
/// are excluded entirely.
#[derive(Debug)]
pub struct MaterialsCatalog {
    requested: Vec<TextureKind>,
    bundles: HashMap<String, BTreeMap<TextureKind, PathBuf>>,
    materials: Vec<String>,
    split: Split,
}

impl MaterialsCatalog {
    pub fn new(root: &Path, requested: &[TextureKind], split: Split) -> DatasetResult<Self> {
        Self::with_seed(root, requested, split, SPLIT_SEED)
    }

    /// Same as [`new`](Self::new) with an explicit shuffle seed. The train
    /// and test catalogs over one root partition cleanly only when built
    /// with the same seed.
    pub fn with_seed(
        root: &Path,
        requested: &[TextureKind],
        split: Split,
        seed: u64,
    ) -> DatasetResult<Self> {
        if requested.is_empty() {
            return Err(DatasetError::EmptyKindSet);
        }
        let requested = dedup_kinds(requested);

        let mut bundles = HashMap::new();
        let mut materials = Vec::new();
        for scanned in scan_root(root, &requested)? {
            if scanned.is_complete() {
                materials.push(scanned.name.clone());
                bundles.insert(scanned.name, scanned.resolved);
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        materials.shuffle(&mut rng);
        let cut = (materials.len() as f32 * TRAIN_FRACTION).floor() as usize;
        let materials = match split {
            Split::Train => materials[..cut].to_vec(),
            Split::Test => materials[cut..].to_vec(),
        };

        Ok(Self {
            requested,
            bundles,
            materials,
            split,
        })
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn split(&self) -> Split {
        self.split
    }

    /// Requested kinds with duplicates removed, in request order.
    pub fn requested_kinds(&self) -> &[TextureKind] {
        &self.requested
    }

    /// Material keys of this split, in shuffled partition order.
    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    /// Decode the material at `index` into one normalized CHW image per
    /// requested kind. Normal maps keep only their first two channels:
    /// the stored third channel carries no information for tangent-space
    /// normals in this pipeline.
    pub fn get(&self, index: usize) -> DatasetResult<MaterialSample> {
        static ONCE: std::sync::Once = std::sync::Once::new();
        let len = self.materials.len();
        let material = self
            .materials
            .get(index)
            .ok_or(DatasetError::OutOfRange { index, len })?;
        let bundle = &self.bundles[material];

        let mut maps = BTreeMap::new();
        for &kind in &self.requested {
            let path = &bundle[&kind];
            let img = image::open(path)
                .map_err(|e| DatasetError::Image {
                    path: path.clone(),
                    source: e,
                })?
                .to_rgb8();
            // Each kind normalizes from its own decoded buffer.
            let mut texture = TextureImage::from_rgb8(&img);
            if kind == TextureKind::Normal {
                texture = texture.truncate_channels(2);
            }
            maps.insert(kind, texture);
        }

        ONCE.call_once(|| {
            eprintln!(
                "Debug: first material sample '{}' with kinds {:?}",
                material, self.requested
            );
        });

        Ok(MaterialSample {
            material: material.clone(),
            maps,
        })
    }
}

#[cfg(test)]
mod catalog_tests {
    use super::dedup_kinds;
    use crate::types::TextureKind;

    #[test]
    fn dedup_preserves_request_order() {
        let kinds = dedup_kinds(&[
            TextureKind::Normal,
            TextureKind::Albedo,
            TextureKind::Normal,
        ]);
        assert_eq!(kinds, vec![TextureKind::Normal, TextureKind::Albedo]);
    }
}
