//! Version service: list, read (optionally diffed) and revert.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::info;

use filetree_core::config::VersionConfig;
use filetree_core::error::AppError;
use filetree_database::DatabasePool;
use filetree_database::repositories::EditRepository;
use filetree_entity::edit::EntityEdit;
use filetree_entity::entity::Entity;

use super::diff::{self, DiffSpan};
use crate::context::RequestContext;
use crate::drive::DriveService;

/// A version's content, plus its diff against the preceding version when
/// one was requested and both sides are text.
#[derive(Debug, Clone)]
pub struct VersionView {
    /// The edit record.
    pub edit: EntityEdit,
    /// Bytes of the version.
    pub content: Bytes,
    /// Spans from the previous version to this one.
    pub diff: Option<Vec<DiffSpan>>,
}

impl VersionView {
    /// The content as text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Manages file version history.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// Database pool.
    db: DatabasePool,
    /// Content collaborator, used for reads and reverts.
    drive: Arc<DriveService>,
    /// Edit repository.
    edits: Arc<EditRepository>,
    /// Diff time budget.
    config: VersionConfig,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        db: DatabasePool,
        drive: Arc<DriveService>,
        edits: Arc<EditRepository>,
        config: VersionConfig,
    ) -> Self {
        Self {
            db,
            drive,
            edits,
            config,
        }
    }

    /// Lists all versions of the entity at `path`, newest first.
    pub async fn list(&self, ctx: &RequestContext, path: &str) -> Result<Vec<EntityEdit>, AppError> {
        let entity = self.drive.info(ctx, path).await?;
        self.edits.list_for_entity(self.db.pool(), entity.id).await
    }

    /// Reads one version. With `with_diff`, text versions that have a
    /// predecessor also carry the diff against it.
    pub async fn read(
        &self,
        ctx: &RequestContext,
        edit_id: i64,
        with_diff: bool,
    ) -> Result<VersionView, AppError> {
        let edit = self.find(ctx, edit_id).await?;
        let content = self.drive.read_blob(&edit.content).await?;

        let diff = match edit.previous.as_deref() {
            Some(previous) if with_diff && !previous.is_empty() => {
                let before = self.drive.read_blob(previous).await?;
                match (std::str::from_utf8(&before), std::str::from_utf8(&content)) {
                    (Ok(old), Ok(new)) => Some(diff::diff(
                        old,
                        new,
                        Duration::from_millis(self.config.diff_timeout_ms),
                    )),
                    _ => None,
                }
            }
            _ => None,
        };

        Ok(VersionView {
            edit,
            content,
            diff,
        })
    }

    /// Makes the version `edit_id` the current content of the file at
    /// `path`. The revert is recorded as a new version; history is never
    /// rewritten.
    pub async fn revert(
        &self,
        ctx: &RequestContext,
        path: &str,
        edit_id: i64,
    ) -> Result<Entity, AppError> {
        ctx.require_writable()?;
        let entity = self.drive.info(ctx, path).await?;
        let edit = self.find(ctx, edit_id).await?;
        if edit.entity_id != entity.id {
            return Err(AppError::not_found(format!(
                "Version {edit_id} does not belong to '{path}'"
            )));
        }

        let reverted = self
            .drive
            .write_existing(ctx, path, &edit.content, edit.modified)
            .await?;

        info!(
            user_id = ctx.user_id,
            tree = ctx.tree_id,
            entity_id = entity.id,
            edit_id,
            path = %path,
            "File reverted to earlier version"
        );
        Ok(reverted)
    }

    async fn find(&self, ctx: &RequestContext, edit_id: i64) -> Result<EntityEdit, AppError> {
        self.edits
            .find_in_tree(self.db.pool(), ctx.tree_id, edit_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {edit_id} not found")))
    }
}
