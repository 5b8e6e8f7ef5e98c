//! Entity tree repository.
//!
//! Paths are compared with `substr` and character lengths rather than
//! `LIKE`, so `%` and `_` inside names carry no special meaning.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor};

use filetree_core::error::AppError;
use filetree_core::result::AppResult;
use filetree_core::types::path::{self, ROOT_PARENT, ROOT_PATH, TRASH_SENTINEL};
use filetree_entity::entity::{CreateEntity, Entity, EntityKind};

use super::{IN_CHUNK_SIZE, map_db_error, map_write_error};

/// Repository for entity rows and subtree path rewrites.
#[derive(Debug, Clone, Default)]
pub struct EntityRepository;

impl EntityRepository {
    /// Create a new entity repository.
    pub fn new() -> Self {
        Self
    }

    /// Find an entity by id within a tree.
    pub async fn find_by_id<'e, E>(&self, executor: E, tree: i64, id: i64) -> AppResult<Option<Entity>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Entity>("SELECT * FROM entity WHERE id = ? AND tree = ?")
            .bind(id)
            .bind(tree)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_db_error("Failed to find entity", e))
    }

    /// Find the entity stored at an exact path.
    ///
    /// Active paths are unique. Several trashed rows may share a marked path,
    /// in which case the most recently created one is returned.
    pub async fn find_by_path<'e, E>(
        &self,
        executor: E,
        tree: i64,
        path: &str,
    ) -> AppResult<Option<Entity>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Entity>(
            "SELECT * FROM entity WHERE tree = ? AND path = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(tree)
        .bind(path)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error("Failed to find entity by path", e))
    }

    /// Find an active folder at the given path.
    pub async fn find_active_folder<'e, E>(
        &self,
        executor: E,
        tree: i64,
        path: &str,
    ) -> AppResult<Option<Entity>>
    where
        E: SqliteExecutor<'e>,
    {
        if path::is_trashed(path) {
            return Ok(None);
        }
        sqlx::query_as::<_, Entity>("SELECT * FROM entity WHERE tree = ? AND path = ? AND type = ?")
            .bind(tree)
            .bind(path)
            .bind(EntityKind::Folder)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_db_error("Failed to find folder", e))
    }

    /// Find the root row of a tree.
    pub async fn find_root<'e, E>(&self, executor: E, tree: i64) -> AppResult<Option<Entity>>
    where
        E: SqliteExecutor<'e>,
    {
        self.find_by_path(executor, tree, ROOT_PATH).await
    }

    /// Return the root row of a tree, creating it when the tree is new.
    pub async fn ensure_root(&self, conn: &mut SqliteConnection, tree: i64) -> AppResult<Entity> {
        sqlx::query(
            "INSERT OR IGNORE INTO entity (tree, path, name, folder, type, content, size, modified) \
             VALUES (?, ?, '', ?, ?, '', 0, ?)",
        )
        .bind(tree)
        .bind(ROOT_PATH)
        .bind(ROOT_PARENT)
        .bind(EntityKind::Folder)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(|e| map_db_error("Failed to create tree root", e))?;

        self.find_root(&mut *conn, tree)
            .await?
            .ok_or_else(|| AppError::database(format!("Tree {tree} has no root after bootstrap")))
    }

    /// List the active direct children of a folder, folders first.
    pub async fn list_active_children<'e, E>(
        &self,
        executor: E,
        tree: i64,
        folder: i64,
    ) -> AppResult<Vec<Entity>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Entity>(
            "SELECT * FROM entity WHERE tree = ? AND folder = ? AND substr(path, 1, 2) <> './' \
             ORDER BY type DESC, name ASC",
        )
        .bind(tree)
        .bind(folder)
        .fetch_all(executor)
        .await
        .map_err(|e| map_db_error("Failed to list children", e))
    }

    /// List the roots of trashed subtrees, folders first.
    pub async fn list_trash_roots<'e, E>(&self, executor: E, tree: i64) -> AppResult<Vec<Entity>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Entity>(
            "SELECT * FROM entity WHERE tree = ? AND folder = ? AND substr(path, 1, 2) = './' \
             ORDER BY type DESC, name ASC",
        )
        .bind(tree)
        .bind(TRASH_SENTINEL)
        .fetch_all(executor)
        .await
        .map_err(|e| map_db_error("Failed to list trash", e))
    }

    /// Whether an active entity occupies `path`.
    pub async fn path_taken<'e, E>(&self, executor: E, tree: i64, path: &str) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM entity WHERE tree = ? AND path = ? \
             AND substr(path, 1, 2) <> './')",
        )
        .bind(tree)
        .bind(path)
        .fetch_one(executor)
        .await
        .map_err(|e| map_db_error("Failed to probe path", e))
    }

    /// Insert a new entity.
    pub async fn create<'e, E>(&self, executor: E, data: &CreateEntity) -> AppResult<Entity>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Entity>(
            "INSERT INTO entity (tree, path, name, folder, type, content, size, modified) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.tree)
        .bind(&data.path)
        .bind(&data.name)
        .bind(data.folder)
        .bind(data.kind)
        .bind(&data.content)
        .bind(data.size)
        .bind(data.modified)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(&format!("Failed to create '{}'", data.path), e))
    }

    /// Set name, path and parent of one row in a single statement.
    pub async fn update_location<'e, E>(
        &self,
        executor: E,
        tree: i64,
        id: i64,
        name: &str,
        path: &str,
        folder: i64,
    ) -> AppResult<Entity>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Entity>(
            "UPDATE entity SET name = ?, path = ?, folder = ? WHERE id = ? AND tree = ? RETURNING *",
        )
        .bind(name)
        .bind(path)
        .bind(folder)
        .bind(id)
        .bind(tree)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(&format!("Failed to move entity {id} to '{path}'"), e))?
        .ok_or_else(|| AppError::not_found(format!("Entity {id} not found")))
    }

    /// Point an entity at a new content blob.
    pub async fn update_content<'e, E>(
        &self,
        executor: E,
        tree: i64,
        id: i64,
        content: &str,
        size: i64,
        modified: DateTime<Utc>,
    ) -> AppResult<Entity>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Entity>(
            "UPDATE entity SET content = ?, size = ?, modified = ? \
             WHERE id = ? AND tree = ? AND type = ? RETURNING *",
        )
        .bind(content)
        .bind(size)
        .bind(modified)
        .bind(id)
        .bind(tree)
        .bind(EntityKind::File)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_db_error("Failed to update content", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Move one active row into the trash: prefix the marker and detach it
    /// from its parent. Returns the number of rows changed.
    pub async fn mark_trashed<'e, E>(&self, executor: E, tree: i64, id: i64) -> AppResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "UPDATE entity SET path = ? || path, folder = ? \
             WHERE id = ? AND tree = ? AND substr(path, 1, 2) <> './'",
        )
        .bind(path::MARKER.to_string())
        .bind(TRASH_SENTINEL)
        .bind(id)
        .bind(tree)
        .execute(executor)
        .await
        .map(|r| r.rows_affected())
        .map_err(|e| map_db_error("Failed to trash entity", e))
    }

    /// Prefix the marker onto every active path below `root_path`.
    /// Parent links are left untouched. Returns the number of rows changed.
    pub async fn mark_subtree_trashed<'e, E>(
        &self,
        executor: E,
        tree: i64,
        root_path: &str,
    ) -> AppResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        let prefix = path::subtree_prefix(root_path);
        sqlx::query(
            "UPDATE entity SET path = ? || path WHERE tree = ? AND substr(path, 1, ?) = ?",
        )
        .bind(path::MARKER.to_string())
        .bind(tree)
        .bind(prefix.chars().count() as i64)
        .bind(&prefix)
        .execute(executor)
        .await
        .map(|r| r.rows_affected())
        .map_err(|e| map_db_error("Failed to trash subtree", e))
    }

    /// Replace `old_prefix` with `new_prefix` on the paths of the given rows.
    ///
    /// Rows whose path does not start with `old_prefix` are left alone; the
    /// returned count lets callers detect them.
    pub async fn rebase_paths(
        &self,
        conn: &mut SqliteConnection,
        tree: i64,
        ids: &[i64],
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        let old_len = old_prefix.chars().count() as i64;
        let mut changed = 0;

        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE entity SET path = ");
            query
                .push_bind(new_prefix)
                .push(" || substr(path, ")
                .push_bind(old_len + 1)
                .push(") WHERE tree = ")
                .push_bind(tree)
                .push(" AND substr(path, 1, ")
                .push_bind(old_len)
                .push(") = ")
                .push_bind(old_prefix)
                .push(" AND id IN (");
            let mut list = query.separated(", ");
            for id in chunk {
                list.push_bind(*id);
            }
            list.push_unseparated(")");

            changed += query
                .build()
                .execute(&mut *conn)
                .await
                .map_err(|e| map_write_error("Failed to rebase subtree paths", e))?
                .rows_affected();
        }

        Ok(changed)
    }

    /// Delete the given rows. Returns the number of rows removed.
    pub async fn delete_ids(&self, conn: &mut SqliteConnection, tree: i64, ids: &[i64]) -> AppResult<u64> {
        let mut removed = 0;

        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM entity WHERE tree = ");
            query.push_bind(tree).push(" AND id IN (");
            let mut list = query.separated(", ");
            for id in chunk {
                list.push_bind(*id);
            }
            list.push_unseparated(")");

            removed += query
                .build()
                .execute(&mut *conn)
                .await
                .map_err(|e| map_db_error("Failed to delete entities", e))?
                .rows_affected();
        }

        Ok(removed)
    }

    /// Collect the ids of every descendant of `root_id` by following parent
    /// links, one level per round trip.
    ///
    /// The root itself is not included. Reaching an id twice means the
    /// parent links form a cycle, which is reported as a database error.
    pub async fn descendant_ids(
        &self,
        conn: &mut SqliteConnection,
        tree: i64,
        root_id: i64,
    ) -> AppResult<Vec<i64>> {
        let mut visited = HashSet::from([root_id]);
        let mut found = Vec::new();
        let mut frontier = vec![root_id];

        while !frontier.is_empty() {
            let mut next = Vec::new();

            for chunk in frontier.chunks(IN_CHUNK_SIZE) {
                let mut query: QueryBuilder<Sqlite> =
                    QueryBuilder::new("SELECT id FROM entity WHERE tree = ");
                query.push_bind(tree).push(" AND folder IN (");
                let mut list = query.separated(", ");
                for id in chunk {
                    list.push_bind(*id);
                }
                list.push_unseparated(") ORDER BY id");

                let children: Vec<i64> = query
                    .build_query_scalar()
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(|e| map_db_error("Failed to collect descendants", e))?;

                for child in children {
                    if !visited.insert(child) {
                        return Err(AppError::database(format!(
                            "Entity {child} reached twice below entity {root_id}: parent links form a cycle"
                        )));
                    }
                    found.push(child);
                    next.push(child);
                }
            }

            frontier = next;
        }

        Ok(found)
    }
}
