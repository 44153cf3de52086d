//! Engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use climate_store::ObjectStorageConfig;

/// Configuration for the computation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Local directory holding dataset directories, if any.
    pub input_data_dir: Option<PathBuf>,
    /// Directory holding region-set definition files.
    pub regions_dir: PathBuf,
    /// Object storage connection, if configured.
    pub object_storage: Option<ObjectStorageConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_data_dir: None,
            regions_dir: PathBuf::from("./regions"),
            object_storage: None,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            input_data_dir: std::env::var("INPUT_DATA_DIR").ok().map(PathBuf::from),
            regions_dir: std::env::var("REGIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./regions")),
            object_storage: ObjectStorageConfig::from_env(),
        }
    }
}
