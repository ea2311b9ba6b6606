//! Scan summaries and quality checks for material roots.
//!
//! Advisory only: incomplete bundles are silently excluded from the catalog,
//! so these reports exist to catch a misconfigured root (wrong naming, maps
//! missing wholesale) before training starts. Nothing here affects catalog
//! membership.

use crate::catalog::{dedup_kinds, scan_root};
use crate::types::{DatasetError, DatasetResult, TextureKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialScanSummary {
    /// Candidate material directories found under the root.
    pub total_entries: usize,
    pub complete: usize,
    pub incomplete: usize,
    /// How many candidates lacked each requested kind.
    pub missing_by_kind: BTreeMap<TextureKind, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanThresholds {
    pub max_incomplete: Option<usize>,
    pub max_incomplete_ratio: Option<f32>,
}

impl ScanThresholds {
    pub fn from_env() -> Self {
        fn parse<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok()?.parse().ok()
        }
        ScanThresholds {
            max_incomplete: parse("PBR_DATASET_MAX_INCOMPLETE"),
            max_incomplete_ratio: parse("PBR_DATASET_MAX_INCOMPLETE_RATIO"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOutcome {
    Pass,
    Warn,
    Fail,
}

impl ScanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanOutcome::Pass => "pass",
            ScanOutcome::Warn => "warn",
            ScanOutcome::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    pub reasons: Vec<String>,
    pub summary: MaterialScanSummary,
}

impl ScanReport {
    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        let data = serde_json::to_vec_pretty(self).map_err(|e| DatasetError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, data).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> DatasetResult<Self> {
        let raw = fs::read(path).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_slice(&raw).map_err(|e| DatasetError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Count complete and incomplete candidates under `root` for the requested
/// kinds. Existence checks only, no decoding.
pub fn summarize_materials(
    root: &Path,
    requested: &[TextureKind],
) -> DatasetResult<MaterialScanSummary> {
    if requested.is_empty() {
        return Err(DatasetError::EmptyKindSet);
    }
    let requested = dedup_kinds(requested);
    let mut summary = MaterialScanSummary::default();
    for scanned in scan_root(root, &requested)? {
        summary.total_entries += 1;
        if scanned.is_complete() {
            summary.complete += 1;
        } else {
            summary.incomplete += 1;
            for kind in &scanned.missing {
                *summary.missing_by_kind.entry(*kind).or_insert(0) += 1;
            }
        }
    }
    Ok(summary)
}

pub fn validate_summary(summary: MaterialScanSummary, thresholds: &ScanThresholds) -> ScanReport {
    let denom = summary.total_entries.max(1) as f32;
    let ratio = summary.incomplete as f32 / denom;

    let mut outcome = ScanOutcome::Pass;
    let mut reasons = Vec::new();

    if let Some(max) = thresholds.max_incomplete {
        if summary.incomplete > max {
            outcome = ScanOutcome::Fail;
            reasons.push(format!(
                "incomplete bundles: {} exceeds max {}",
                summary.incomplete, max
            ));
        }
    }
    if let Some(max_r) = thresholds.max_incomplete_ratio {
        if ratio > max_r {
            outcome = ScanOutcome::Fail;
            reasons.push(format!(
                "incomplete bundles: ratio {:.3} exceeds max {:.3}",
                ratio, max_r
            ));
        }
    }
    if summary.incomplete > 0 {
        if outcome == ScanOutcome::Pass {
            outcome = ScanOutcome::Warn;
        }
        reasons.push(format!(
            "incomplete bundles: {} observed",
            summary.incomplete
        ));
    }

    ScanReport {
        outcome,
        reasons,
        summary,
    }
}

pub fn summarize_root_with_thresholds(
    root: &Path,
    requested: &[TextureKind],
    thresholds: &ScanThresholds,
) -> DatasetResult<ScanReport> {
    let summary = summarize_materials(root, requested)?;
    Ok(validate_summary(summary, thresholds))
}
