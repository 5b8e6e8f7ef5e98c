//! Edit history repository. The table is append-only: there is no update
//! or delete here, and triggers reject both at the database level.

use sqlx::SqliteExecutor;

use filetree_core::result::AppResult;
use filetree_entity::edit::{EntityEdit, NewEntityEdit};

use super::map_db_error;

/// Repository for `entity_edit` rows.
#[derive(Debug, Clone, Default)]
pub struct EditRepository;

impl EditRepository {
    /// Create a new edit repository.
    pub fn new() -> Self {
        Self
    }

    /// Append an edit record.
    pub async fn append<'e, E>(&self, executor: E, data: &NewEntityEdit) -> AppResult<EntityEdit>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntityEdit>(
            "INSERT INTO entity_edit (entity_id, content, modified, user_id, previous, origin) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.entity_id)
        .bind(&data.content)
        .bind(data.modified)
        .bind(data.user_id)
        .bind(&data.previous)
        .bind(data.origin)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error("Failed to record edit", e))
    }

    /// Content key of the most recent edit of an entity.
    pub async fn latest_content<'e, E>(&self, executor: E, entity_id: i64) -> AppResult<Option<String>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, String>(
            "SELECT content FROM entity_edit WHERE entity_id = ? \
             ORDER BY modified DESC, id DESC LIMIT 1",
        )
        .bind(entity_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error("Failed to look up latest edit", e))
    }

    /// All edits of an entity, newest first.
    pub async fn list_for_entity<'e, E>(&self, executor: E, entity_id: i64) -> AppResult<Vec<EntityEdit>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntityEdit>(
            "SELECT * FROM entity_edit WHERE entity_id = ? ORDER BY modified DESC, id DESC",
        )
        .bind(entity_id)
        .fetch_all(executor)
        .await
        .map_err(|e| map_db_error("Failed to list edits", e))
    }

    /// Find an edit whose entity still exists in the given tree.
    pub async fn find_in_tree<'e, E>(&self, executor: E, tree: i64, id: i64) -> AppResult<Option<EntityEdit>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntityEdit>(
            "SELECT entity_edit.* FROM entity_edit \
             INNER JOIN entity ON entity.id = entity_edit.entity_id \
             WHERE entity_edit.id = ? AND entity.tree = ?",
        )
        .bind(id)
        .bind(tree)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error("Failed to find edit", e))
    }
}
