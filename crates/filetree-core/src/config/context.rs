//! Request identity configuration.

use serde::{Deserialize, Serialize};

/// Identity resolved for every request.
///
/// Authentication is handled upstream; the server acts for a single user
/// inside a single tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// User id recorded on version snapshots and favorites.
    #[serde(default = "default_user_id")]
    pub default_user_id: i64,
    /// Tree (workspace) every request operates in.
    #[serde(default = "default_tree_id")]
    pub default_tree_id: i64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_user_id: default_user_id(),
            default_tree_id: default_tree_id(),
        }
    }
}

fn default_user_id() -> i64 {
    1
}

fn default_tree_id() -> i64 {
    1
}
