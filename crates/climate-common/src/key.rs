//! Dataset keys and storage locations.
//!
//! A dataset object is named `{variable}_{level}_{dataset}_{region_set}.zarr`.
//! The registry parses object names against that pattern; this module owns
//! both directions of the mapping.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Filename extension for chunked array datasets.
pub const DATASET_EXTENSION: &str = ".zarr";

/// Uniquely identifies one storage-backed array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    /// Variable short name (e.g. "tas", "fd").
    pub variable: String,
    /// Vertical level, "None" for surface/single-level variables.
    pub level: String,
    /// Source dataset identifier (e.g. "ERA5").
    pub dataset: String,
    /// Region set the dataset's masks are aligned to (e.g. "NUTS-0").
    pub region_set: String,
}

impl DatasetKey {
    pub fn new(
        variable: impl Into<String>,
        level: impl Into<String>,
        dataset: impl Into<String>,
        region_set: impl Into<String>,
    ) -> Self {
        Self {
            variable: variable.into(),
            level: level.into(),
            dataset: dataset.into(),
            region_set: region_set.into(),
        }
    }

    /// Build a key from request parameters.
    ///
    /// Request variables arrive combined with their level ("tas_None");
    /// a bare name without a level gets "None".
    pub fn from_request(variable: &str, dataset: &str, region_set: &str) -> Self {
        let (varname, level) = match variable.rsplit_once('_') {
            Some((v, l)) if !v.is_empty() => (v, l),
            _ => (variable, "None"),
        };
        Self::new(varname, level, dataset, region_set)
    }

    /// Parse an object name like `tas_None_ERA5_NUTS-0.zarr`.
    ///
    /// Returns `None` for names that do not match the pattern; registry
    /// scans skip those rather than failing.
    pub fn from_object_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(DATASET_EXTENSION)?;
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }

    /// Canonical object name for this key.
    pub fn object_name(&self) -> String {
        format!(
            "{}_{}_{}_{}{}",
            self.variable, self.level, self.dataset, self.region_set, DATASET_EXTENSION
        )
    }

    /// Combined variable name as it appears in requests ("tas_None").
    pub fn combined_variable(&self) -> String {
        format!("{}_{}", self.variable, self.level)
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.variable, self.level, self.dataset, self.region_set
        )
    }
}

/// Where one dataset can be loaded from.
///
/// At least one side is always present; the loader tries `local` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    /// Local dataset directory, if a local data dir is configured.
    pub local: Option<PathBuf>,
    /// Remote URI (`s3://bucket/name.zarr`), if object storage is configured.
    pub remote: Option<String>,
}

impl StorageLocation {
    /// Split a remote URI into (bucket, object prefix).
    pub fn parse_remote_uri(uri: &str) -> Option<(&str, &str)> {
        let rest = uri.strip_prefix("s3://")?;
        let (bucket, prefix) = rest.split_once('/')?;
        if bucket.is_empty() || prefix.is_empty() {
            return None;
        }
        Some((bucket, prefix))
    }
}
