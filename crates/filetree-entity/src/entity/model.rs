//! Entity row model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use filetree_core::types::path;

use super::kind::EntityKind;

/// A file or folder in a tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entity {
    /// Unique entity identifier; survives rename, trash and restore.
    pub id: i64,
    /// The tree (workspace) this entity belongs to.
    pub tree: i64,
    /// Full path from the tree root, marker-prefixed while trashed.
    pub path: String,
    /// Final path segment.
    pub name: String,
    /// Parent entity id, [`path::TRASH_SENTINEL`] for a trash root or
    /// [`path::ROOT_PARENT`] for the tree root itself.
    pub folder: i64,
    /// File or folder.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Storage key of the current content blob; empty for folders and
    /// files that were never written.
    pub content: String,
    /// Content size in bytes.
    pub size: i64,
    /// Last content modification.
    pub modified: DateTime<Utc>,
}

impl Entity {
    /// Whether this entity currently lives in the trash namespace.
    pub fn is_trashed(&self) -> bool {
        path::is_trashed(&self.path)
    }

    /// Whether this entity is the top of a trashed subtree.
    pub fn is_trash_root(&self) -> bool {
        self.folder == path::TRASH_SENTINEL && self.is_trashed()
    }

    /// Check if this entity is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new entity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntity {
    /// The owning tree.
    pub tree: i64,
    /// Full active path.
    pub path: String,
    /// Final path segment.
    pub name: String,
    /// Parent folder id.
    pub folder: i64,
    /// File or folder.
    pub kind: EntityKind,
    /// Initial content key (usually empty).
    pub content: String,
    /// Initial size.
    pub size: i64,
    /// Creation timestamp.
    pub modified: DateTime<Utc>,
}
