//! Trash service: soft delete, restore and purge of entity subtrees.

use std::sync::Arc;

use tracing::{info, warn};

use filetree_core::config::TrashConfig;
use filetree_core::error::{AppError, ErrorKind};
use filetree_core::types::path;
use filetree_database::DatabasePool;
use filetree_database::repositories::{EntityRepository, MarkerRepository};
use filetree_entity::entity::Entity;

use crate::context::RequestContext;

/// How many times a restore is re-run after losing a race for its target
/// path to a concurrent writer.
const RESTORE_TX_ATTEMPTS: u32 = 3;

/// Moves entities between the active tree and the trash.
///
/// Each transition runs in a single transaction, so readers never see a
/// subtree whose root and descendants disagree about being trashed.
#[derive(Debug, Clone)]
pub struct TrashService {
    /// Database pool.
    db: DatabasePool,
    /// Entity repository.
    entities: Arc<EntityRepository>,
    /// Favorites, tags and shares.
    markers: Arc<MarkerRepository>,
    /// Restore naming settings.
    config: TrashConfig,
}

impl TrashService {
    /// Creates a new trash service.
    pub fn new(
        db: DatabasePool,
        entities: Arc<EntityRepository>,
        markers: Arc<MarkerRepository>,
        config: TrashConfig,
    ) -> Self {
        Self {
            db,
            entities,
            markers,
            config,
        }
    }

    /// Lists the roots of trashed subtrees, folders first.
    pub async fn list_trash(&self, ctx: &RequestContext) -> Result<Vec<Entity>, AppError> {
        self.entities.list_trash_roots(self.db.pool(), ctx.tree_id).await
    }

    /// Soft-deletes the active entity at `path` together with its subtree.
    pub async fn delete(&self, ctx: &RequestContext, path: &str) -> Result<(), AppError> {
        ctx.require_writable()?;

        if path::is_trashed(path) {
            return Err(AppError::precondition(format!("'{path}' is already in the trash")));
        }
        if path == path::ROOT_PATH {
            return Err(AppError::precondition("The tree root cannot be deleted"));
        }

        let mut tx = self.db.begin().await?;

        let entity = match self
            .entities
            .find_by_path(&mut *tx, ctx.tree_id, path)
            .await?
        {
            Some(entity) => entity,
            None => {
                let trashed = self
                    .entities
                    .find_by_path(&mut *tx, ctx.tree_id, &path::mark(path))
                    .await?;
                return Err(match trashed {
                    Some(_) => AppError::precondition(format!("'{path}' is already in the trash")),
                    None => AppError::not_found(format!("'{path}' not found")),
                });
            }
        };

        if self
            .entities
            .mark_trashed(&mut *tx, ctx.tree_id, entity.id)
            .await?
            != 1
        {
            return Err(AppError::precondition(format!("'{path}' is already in the trash")));
        }

        let descendants = if entity.is_folder() {
            self.entities
                .mark_subtree_trashed(&mut *tx, ctx.tree_id, &entity.path)
                .await?
        } else {
            0
        };

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit delete", e)
        })?;

        info!(
            user_id = ctx.user_id,
            tree = ctx.tree_id,
            entity_id = entity.id,
            path = %entity.path,
            descendants,
            "Entity moved to trash"
        );
        Ok(())
    }

    /// Restores a trashed entity and its subtree, returning the restored
    /// entity. The target name gets the configured suffix appended until it
    /// is free.
    pub async fn restore(&self, ctx: &RequestContext, id: i64) -> Result<Entity, AppError> {
        ctx.require_writable()?;

        for attempt in 1..=RESTORE_TX_ATTEMPTS {
            if let Some(restored) = self.try_restore(ctx, id).await? {
                return Ok(restored);
            }
            warn!(
                entity_id = id,
                attempt,
                "Restore target was claimed concurrently, retrying"
            );
        }

        Err(AppError::conflict(format!(
            "Could not restore entity {id}: target path kept being claimed"
        )))
    }

    /// One restore transaction. `Ok(None)` means the chosen path was taken
    /// between probing and claiming it; nothing was changed.
    async fn try_restore(&self, ctx: &RequestContext, id: i64) -> Result<Option<Entity>, AppError> {
        let tree = ctx.tree_id;
        let mut tx = self.db.begin().await?;

        let entity = self
            .entities
            .find_by_id(&mut *tx, tree, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entity {id} not found")))?;
        let original = path::unmark(&entity.path)
            .ok_or_else(|| {
                AppError::precondition(format!("Entity {id} ('{}') is not in the trash", entity.path))
            })?
            .to_string();

        let descendants = if entity.is_folder() {
            self.entities.descendant_ids(&mut tx, tree, id).await?
        } else {
            Vec::new()
        };

        let restore_dir = path::parent_dir(&original);
        let parent = match self
            .entities
            .find_active_folder(&mut *tx, tree, restore_dir)
            .await?
        {
            Some(folder) => folder,
            None => self.entities.ensure_root(&mut tx, tree).await?,
        };

        let Some((name, target)) = self.free_target(&mut tx, tree, &parent.path, &entity.name).await?
        else {
            return Err(AppError::conflict(format!(
                "No free name for '{}' after {} attempts",
                entity.name, self.config.max_restore_attempts
            )));
        };

        let restored = match self
            .entities
            .update_location(&mut *tx, tree, id, &name, &target, parent.id)
            .await
        {
            Ok(restored) => restored,
            Err(e) if e.is(ErrorKind::Conflict) => return Ok(None),
            Err(e) => return Err(e),
        };

        if !descendants.is_empty() {
            let old_prefix = path::subtree_prefix(&entity.path);
            let new_prefix = path::subtree_prefix(&target);
            let changed = match self
                .entities
                .rebase_paths(&mut tx, tree, &descendants, &old_prefix, &new_prefix)
                .await
            {
                Ok(changed) => changed,
                Err(e) if e.is(ErrorKind::Conflict) => return Ok(None),
                Err(e) => return Err(e),
            };
            if changed != descendants.len() as u64 {
                return Err(AppError::database(format!(
                    "Subtree of entity {id} is inconsistent: {} of {} descendants live under '{old_prefix}'",
                    changed,
                    descendants.len()
                )));
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit restore", e)
        })?;

        info!(
            user_id = ctx.user_id,
            tree,
            entity_id = id,
            from = %entity.path,
            path = %restored.path,
            descendants = descendants.len(),
            "Entity restored from trash"
        );
        Ok(Some(restored))
    }

    /// First free `(name, path)` below `dir`, appending the restore suffix
    /// on every collision. `None` once the attempt limit is exhausted.
    async fn free_target(
        &self,
        conn: &mut sqlx::SqliteConnection,
        tree: i64,
        dir: &str,
        name: &str,
    ) -> Result<Option<(String, String)>, AppError> {
        let mut name = name.to_string();
        let mut target = path::join(dir, &name);

        for _ in 0..self.config.max_restore_attempts {
            if !self.entities.path_taken(&mut *conn, tree, &target).await? {
                return Ok(Some((name, target)));
            }
            name.push_str(&self.config.restore_suffix);
            target.push_str(&self.config.restore_suffix);
        }
        Ok(None)
    }

    /// Permanently removes a trashed entity, its subtree and their
    /// favorites (of the acting user), tags and shares. Edit history is
    /// kept.
    pub async fn purge(&self, ctx: &RequestContext, id: i64) -> Result<(), AppError> {
        ctx.require_writable()?;
        let tree = ctx.tree_id;
        let mut tx = self.db.begin().await?;

        let entity = self
            .entities
            .find_by_id(&mut *tx, tree, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entity {id} not found")))?;
        if !entity.is_trashed() {
            return Err(AppError::precondition(format!(
                "Entity {id} ('{}') is not in the trash",
                entity.path
            )));
        }

        let mut ids = vec![id];
        if entity.is_folder() {
            ids.extend(self.entities.descendant_ids(&mut tx, tree, id).await?);
        }

        let favorites = self.markers.delete_favorites(&mut tx, ctx.user_id, &ids).await?;
        let tags = self.markers.delete_tags(&mut tx, &ids).await?;
        let shares = self.markers.delete_shares(&mut tx, &ids).await?;
        let removed = self.entities.delete_ids(&mut tx, tree, &ids).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit purge", e)
        })?;

        info!(
            user_id = ctx.user_id,
            tree,
            entity_id = id,
            path = %entity.path,
            removed,
            favorites,
            tags,
            shares,
            "Entity purged"
        );
        Ok(())
    }
}
