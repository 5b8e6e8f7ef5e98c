//! Content storage configuration.

use serde::{Deserialize, Serialize};

/// Content blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for content blobs.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Maximum upload size in bytes (default 10 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Reject every mutating operation with access-denied.
    #[serde(default)]
    pub readonly: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            max_upload_size_bytes: default_max_upload(),
            readonly: false,
        }
    }
}

fn default_data_root() -> String {
    "./data/blobs".to_string()
}

fn default_max_upload() -> u64 {
    10_000_000
}
