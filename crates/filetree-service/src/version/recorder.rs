//! Appends an edit record for every content write.
//!
//! The recorder runs inside the write's transaction, so a content change and
//! its history entry become visible together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use filetree_core::error::AppError;
use filetree_database::repositories::EditRepository;
use filetree_entity::edit::{EntityEdit, NewEntityEdit};
use filetree_entity::entity::Entity;

use crate::context::RequestContext;

/// Records [`EntityEdit`] rows on behalf of the content-write path.
#[derive(Debug, Clone)]
pub struct EditRecorder {
    /// Edit repository.
    edits: Arc<EditRepository>,
}

impl EditRecorder {
    /// Creates a new recorder.
    pub fn new(edits: Arc<EditRepository>) -> Self {
        Self { edits }
    }

    /// Append an edit for `entity`, which must already carry the content it
    /// holds after the write.
    ///
    /// `previous` is filled from the latest earlier edit. Failing to look it
    /// up only costs the diff against the prior version, so the write still
    /// goes through.
    pub async fn record(
        &self,
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        entity: &Entity,
        origin: Option<DateTime<Utc>>,
    ) -> Result<EntityEdit, AppError> {
        let previous = match self.edits.latest_content(&mut *conn, entity.id).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!(
                    entity_id = entity.id,
                    error = %e,
                    "Could not look up previous edit, recording without it"
                );
                None
            }
        };

        let edit = self
            .edits
            .append(
                &mut *conn,
                &NewEntityEdit {
                    entity_id: entity.id,
                    content: entity.content.clone(),
                    modified: entity.modified,
                    user_id: ctx.user_id,
                    previous,
                    origin,
                },
            )
            .await?;

        debug!(
            entity_id = entity.id,
            edit_id = edit.id,
            revert = edit.is_revert(),
            "Edit recorded"
        );
        Ok(edit)
    }
}
