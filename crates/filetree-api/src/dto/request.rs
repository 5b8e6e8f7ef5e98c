//! Request DTOs with validation.
//!
//! Path-form `id`s are tree-relative paths; numeric `id`s refer to trashed
//! entities as listed by `GET /files?source=trash`.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `?id=<path>` query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PathQuery {
    /// Tree-relative path.
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
}

/// `GET /files` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FilesQuery {
    /// Folder to list, the root when absent.
    #[validate(length(min = 1))]
    pub id: Option<String>,
    /// `trash` lists the trash instead of a folder.
    pub source: Option<String>,
}

impl FilesQuery {
    /// Whether the trash listing was requested.
    pub fn is_trash(&self) -> bool {
        self.source.as_deref() == Some("trash")
    }
}

/// `GET /direct` query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DirectQuery {
    /// File path.
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// Present to force `attachment` disposition.
    pub download: Option<String>,
}

/// Restore and purge form: the numeric id of a trashed entity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrashedIdForm {
    /// Entity ID.
    #[validate(range(min = 1, message = "id must be a positive entity id"))]
    pub id: i64,
}

/// `POST /makefile` and `POST /makedir` form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MakeForm {
    /// Parent folder path.
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// New entity name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// `POST /text` form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TextForm {
    /// File path.
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// New content.
    pub content: String,
}

/// `POST /versions` form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RevertForm {
    /// File path.
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,
    /// Version to revert to.
    #[validate(range(min = 1))]
    pub version: i64,
}

/// How a version body is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionMode {
    /// Escaped text, or an HTML diff with `diff`.
    Text,
    /// Raw bytes.
    #[default]
    Binary,
}

/// `GET /versions/{id}` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct VersionQuery {
    /// Present (with any value) to request a diff.
    pub diff: Option<String>,
    /// Response mode.
    pub mode: Option<VersionMode>,
}

impl VersionQuery {
    /// Whether a diff against the previous version was requested.
    pub fn wants_diff(&self) -> bool {
        self.diff.is_some()
    }
}
