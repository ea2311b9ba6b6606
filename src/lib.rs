//! Dataset preparation for PBR surface-material textures.
//!
//! This crate provides utilities for:
//! - Discovering per-material texture bundles on disk
//! - Deterministic seeded train/test partitioning
//! - Lazily decoded material samples in channel-first layout
//! - Random-crop patch sampling over an eager in-memory image store
//!
//! Batching, grid assembly, and display belong to the consumer.

pub mod catalog;
pub mod patch;
pub mod types;
pub mod validation;

pub use catalog::{MaterialsCatalog, SPLIT_SEED, TRAIN_FRACTION};
pub use patch::PatchSampler;
pub use types::*;
pub use validation::{
    summarize_materials, summarize_root_with_thresholds, validate_summary, MaterialScanSummary,
    ScanOutcome, ScanReport, ScanThresholds,
};
