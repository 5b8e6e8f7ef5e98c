//! Soft delete, restore and purge handlers.

use axum::Json;
use axum::extract::State;

use filetree_entity::entity::EntityInfo;

use crate::dto::request::{PathQuery, TrashedIdForm};
use crate::error::ApiError;
use crate::extractors::{CurrentContext, ValidForm, ValidQuery};
use crate::state::AppState;

/// DELETE /delete?id=<path>
pub async fn delete_entity(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<PathQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.trash.delete(&ctx, &query.id).await?;
    Ok(Json(serde_json::json!({})))
}

/// PUT /delete (form `id`)
pub async fn restore_entity(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidForm(form): ValidForm<TrashedIdForm>,
) -> Result<Json<EntityInfo>, ApiError> {
    let restored = state.trash.restore(&ctx, form.id).await?;
    Ok(Json(EntityInfo::from_entity(&restored)))
}

/// POST /delete (form `id`)
pub async fn purge_entity(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidForm(form): ValidForm<TrashedIdForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.trash.purge(&ctx, form.id).await?;
    Ok(Json(serde_json::json!({})))
}
