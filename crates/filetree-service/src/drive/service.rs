//! Drive service: lookups, folder listing, creation and content writes.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use filetree_core::error::{AppError, ErrorKind};
use filetree_core::traits::storage::{ByteStream, StorageProvider};
use filetree_core::types::path;
use filetree_database::DatabasePool;
use filetree_database::repositories::EntityRepository;
use filetree_entity::entity::{CreateEntity, Entity, EntityKind};

use crate::context::RequestContext;
use crate::version::EditRecorder;

/// The content side of the tree: resolves paths, creates entities and
/// writes file content.
///
/// Every write stores its bytes under a fresh key and then, in one
/// transaction, repoints the entity and records the edit.
#[derive(Debug, Clone)]
pub struct DriveService {
    /// Database pool.
    db: DatabasePool,
    /// Content blob storage.
    storage: Arc<dyn StorageProvider>,
    /// Entity repository.
    entities: Arc<EntityRepository>,
    /// Edit recorder shared with the version service.
    recorder: Arc<EditRecorder>,
}

impl DriveService {
    /// Creates a new drive service.
    pub fn new(
        db: DatabasePool,
        storage: Arc<dyn StorageProvider>,
        entities: Arc<EntityRepository>,
        recorder: Arc<EditRecorder>,
    ) -> Self {
        Self {
            db,
            storage,
            entities,
            recorder,
        }
    }

    /// Creates the root folder of a tree if it does not exist yet.
    pub async fn ensure_root(&self, tree: i64) -> Result<Entity, AppError> {
        let mut conn = self.db.pool().acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        self.entities.ensure_root(&mut conn, tree).await
    }

    /// Resolves an active entity by path.
    pub async fn info(&self, ctx: &RequestContext, path: &str) -> Result<Entity, AppError> {
        if path::is_trashed(path) {
            return Err(AppError::not_found(format!("'{path}' is in the trash")));
        }
        self.entities
            .find_by_path(self.db.pool(), ctx.tree_id, path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("'{path}' not found")))
    }

    /// Lists the active children of a folder, folders first.
    pub async fn list(&self, ctx: &RequestContext, path: &str) -> Result<Vec<Entity>, AppError> {
        let folder = self.info(ctx, path).await?;
        if !folder.is_folder() {
            return Err(AppError::validation(format!("'{path}' is not a folder")));
        }
        self.entities
            .list_active_children(self.db.pool(), ctx.tree_id, folder.id)
            .await
    }

    /// Reads the current content of a file.
    pub async fn read(&self, ctx: &RequestContext, path: &str) -> Result<Bytes, AppError> {
        let file = self.info(ctx, path).await?;
        if file.is_folder() {
            return Err(AppError::validation(format!("'{path}' is a folder")));
        }
        self.read_blob(&file.content).await
    }

    /// Reads a content blob by key. The empty key is the empty file.
    pub async fn read_blob(&self, key: &str) -> Result<Bytes, AppError> {
        if key.is_empty() {
            return Ok(Bytes::new());
        }
        self.storage.read_bytes(key).await
    }

    /// Creates a file or folder named `name` inside the folder at `parent_path`.
    pub async fn make(
        &self,
        ctx: &RequestContext,
        parent_path: &str,
        name: &str,
        is_folder: bool,
    ) -> Result<Entity, AppError> {
        ctx.require_writable()?;
        path::validate_name(name)?;

        let parent = self
            .entities
            .find_active_folder(self.db.pool(), ctx.tree_id, parent_path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder '{parent_path}' not found")))?;

        let target = path::join(&parent.path, name);
        let kind = if is_folder {
            EntityKind::Folder
        } else {
            EntityKind::File
        };
        let entity = self
            .entities
            .create(
                self.db.pool(),
                &CreateEntity {
                    tree: ctx.tree_id,
                    path: target,
                    name: name.to_string(),
                    folder: parent.id,
                    kind,
                    content: String::new(),
                    size: 0,
                    modified: Utc::now(),
                },
            )
            .await?;

        info!(
            user_id = ctx.user_id,
            tree = ctx.tree_id,
            entity_id = entity.id,
            path = %entity.path,
            kind = %kind,
            "Entity created"
        );
        Ok(entity)
    }

    /// Replaces the content of the file at `path` and records a version.
    ///
    /// `origin` marks the write as a revert to the version modified at
    /// that moment.
    pub async fn write(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: Bytes,
        origin: Option<DateTime<Utc>>,
    ) -> Result<Entity, AppError> {
        ctx.require_writable()?;
        let file = self.file_at(ctx, path).await?;

        let key = self.new_key(ctx);
        let size = data.len() as i64;
        self.storage.write(&key, data).await?;

        self.commit_write(ctx, &file, &key, size, origin, true).await
    }

    /// Opens the current content of a file as a byte stream.
    pub async fn open(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> Result<(Entity, ByteStream), AppError> {
        let file = self.file_at(ctx, path).await?;
        if file.content.is_empty() {
            let empty: ByteStream = Box::pin(futures::stream::empty());
            return Ok((file, empty));
        }
        let stream = self.storage.read(&file.content).await?;
        Ok((file, stream))
    }

    /// Points the file at `path` back at an existing blob and records a
    /// version stamped with `origin`.
    ///
    /// Blobs are immutable, so the key is shared rather than copied.
    pub async fn write_existing(
        &self,
        ctx: &RequestContext,
        path: &str,
        key: &str,
        origin: DateTime<Utc>,
    ) -> Result<Entity, AppError> {
        ctx.require_writable()?;
        let file = self.file_at(ctx, path).await?;

        let size = self.read_blob(key).await?.len() as i64;
        self.commit_write(ctx, &file, key, size, Some(origin), false)
            .await
    }

    async fn file_at(&self, ctx: &RequestContext, path: &str) -> Result<Entity, AppError> {
        let file = self.info(ctx, path).await?;
        if file.is_folder() {
            return Err(AppError::validation(format!(
                "'{path}' is a folder and has no content"
            )));
        }
        Ok(file)
    }

    fn new_key(&self, ctx: &RequestContext) -> String {
        format!("{}/{}", ctx.tree_id, Uuid::new_v4())
    }

    /// Repoint the entity at `key` and append the edit in one transaction.
    /// On failure a freshly written blob is removed again (best effort).
    async fn commit_write(
        &self,
        ctx: &RequestContext,
        file: &Entity,
        key: &str,
        size: i64,
        origin: Option<DateTime<Utc>>,
        fresh_blob: bool,
    ) -> Result<Entity, AppError> {
        let result = async {
            let mut tx = self.db.begin().await?;
            let updated = self
                .entities
                .update_content(&mut *tx, ctx.tree_id, file.id, key, size, Utc::now())
                .await?;
            let edit = self.recorder.record(&mut *tx, ctx, &updated, origin).await?;
            tx.commit().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to commit content write", e)
            })?;
            Ok::<_, AppError>((updated, edit))
        }
        .await;

        match result {
            Ok((updated, edit)) => {
                info!(
                    user_id = ctx.user_id,
                    tree = ctx.tree_id,
                    entity_id = updated.id,
                    edit_id = edit.id,
                    path = %updated.path,
                    size,
                    "Content written"
                );
                Ok(updated)
            }
            Err(e) => {
                if fresh_blob {
                    if let Err(cleanup) = self.storage.delete(key).await {
                        warn!(key, error = %cleanup, "Failed to remove orphaned blob");
                    }
                }
                Err(e)
            }
        }
    }
}
