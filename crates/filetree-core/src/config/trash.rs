//! Trash and version history configuration.

use serde::{Deserialize, Serialize};

/// Trash / restore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashConfig {
    /// Suffix appended to a restored name while its target path is occupied.
    #[serde(default = "default_restore_suffix")]
    pub restore_suffix: String,
    /// Upper bound on collision probes before a restore fails with a conflict.
    #[serde(default = "default_max_restore_attempts")]
    pub max_restore_attempts: u32,
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            restore_suffix: default_restore_suffix(),
            max_restore_attempts: default_max_restore_attempts(),
        }
    }
}

/// Version history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Time budget for one diff in milliseconds. When it runs out, the
    /// remaining difference is reported as a single removal and insertion.
    #[serde(default = "default_diff_timeout_ms")]
    pub diff_timeout_ms: u64,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            diff_timeout_ms: default_diff_timeout_ms(),
        }
    }
}

fn default_restore_suffix() -> String {
    ".restored".to_string()
}

fn default_max_restore_attempts() -> u32 {
    64
}

fn default_diff_timeout_ms() -> u64 {
    1000
}
