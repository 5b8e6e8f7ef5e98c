//! Entity edit (version snapshot) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded content write. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EntityEdit {
    /// Unique edit identifier.
    pub id: i64,
    /// The entity that was written.
    pub entity_id: i64,
    /// Content key the entity held once this write was applied.
    pub content: String,
    /// Modification time of the entity at the moment of the write.
    pub modified: DateTime<Utc>,
    /// Who triggered the write.
    pub user_id: i64,
    /// Content key of the edit immediately preceding this one.
    pub previous: Option<String>,
    /// Set when this write restored a historical version; the `modified`
    /// of the restored edit.
    pub origin: Option<DateTime<Utc>>,
}

impl EntityEdit {
    /// Whether this edit was produced by reverting to an earlier version.
    pub fn is_revert(&self) -> bool {
        self.origin.is_some()
    }
}

/// Data required to append an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntityEdit {
    /// The entity that was written.
    pub entity_id: i64,
    /// Content key after the write.
    pub content: String,
    /// Entity modification time after the write.
    pub modified: DateTime<Utc>,
    /// Acting user.
    pub user_id: i64,
    /// Content key of the latest earlier edit, if any.
    pub previous: Option<String>,
    /// Timestamp of the restored version, for reverts.
    pub origin: Option<DateTime<Utc>>,
}
