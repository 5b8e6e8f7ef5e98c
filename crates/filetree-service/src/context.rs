//! Request context carrying the acting user and the tree they work in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filetree_core::config::ContextConfig;
use filetree_core::error::AppError;

/// Context for the current request.
///
/// Built by the HTTP layer for every request and passed into service
/// methods, so that every operation knows *who* is acting and in *which*
/// tree. Clients never supply these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: i64,
    /// The tree (workspace) all paths are resolved in.
    pub tree_id: i64,
    /// Whether mutations are rejected.
    pub readonly: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: i64, tree_id: i64, readonly: bool) -> Self {
        Self {
            user_id,
            tree_id,
            readonly,
            request_time: Utc::now(),
        }
    }

    /// Creates the context configured for this deployment.
    pub fn from_config(config: &ContextConfig, readonly: bool) -> Self {
        Self::new(config.default_user_id, config.default_tree_id, readonly)
    }

    /// Fails with access-denied when the drive is read-only.
    pub fn require_writable(&self) -> Result<(), AppError> {
        if self.readonly {
            return Err(AppError::authorization("Access denied: the drive is read-only"));
        }
        Ok(())
    }
}
