//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filetree_entity::edit::EntityEdit;

/// One entry of `GET /versions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionItem {
    /// Edit ID.
    pub id: i64,
    /// When the version was written.
    pub date: DateTime<Utc>,
    /// Author.
    pub user: i64,
    /// Content key.
    pub content: String,
    /// Date of the version this one reverted to.
    pub origin: Option<DateTime<Utc>>,
}

impl From<EntityEdit> for VersionItem {
    fn from(edit: EntityEdit) -> Self {
        Self {
            id: edit.id,
            date: edit.modified,
            user: edit.user_id,
            content: edit.content,
            origin: edit.origin,
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Database reachable.
    pub database: bool,
    /// Blob storage reachable.
    pub storage: bool,
}
