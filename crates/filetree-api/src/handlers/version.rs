//! Version history handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use filetree_core::error::AppError;
use filetree_entity::entity::EntityInfo;
use filetree_service::version::diff;

use crate::dto::request::{PathQuery, RevertForm, VersionMode, VersionQuery};
use crate::dto::response::VersionItem;
use crate::error::ApiError;
use crate::extractors::{CurrentContext, ValidForm, ValidQuery};
use crate::state::AppState;

/// GET /versions?id=<path>
pub async fn list_versions(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<PathQuery>,
) -> Result<Json<Vec<VersionItem>>, ApiError> {
    let edits = state.versions.list(&ctx, &query.id).await?;
    Ok(Json(edits.into_iter().map(VersionItem::from).collect()))
}

/// GET /versions/{id}?diff&mode=text|binary
///
/// Text mode returns escaped text, or the HTML diff against the previous
/// version when `diff` is present. Binary mode returns the raw bytes.
pub async fn get_version(
    State(state): State<AppState>,
    ctx: CurrentContext,
    Path(id): Path<String>,
    ValidQuery(query): ValidQuery<VersionQuery>,
) -> Result<Response, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid version id: {id}")))?;
    let mode = query.mode.unwrap_or_default();
    let with_diff = query.wants_diff() && mode == VersionMode::Text;

    let view = state.versions.read(&ctx, id, with_diff).await?;

    match mode {
        VersionMode::Text => {
            let body = match &view.diff {
                Some(spans) => diff::render_html(spans),
                None => diff::escape_html(&String::from_utf8_lossy(&view.content)),
            };
            Ok((
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response())
        }
        VersionMode::Binary => {
            let filename = view.edit.content.rsplit('/').next().unwrap_or_default();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/octet-stream")
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{filename}\""),
                )
                .header(header::CONTENT_LENGTH, view.content.len())
                .body(Body::from(view.content))
                .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
        }
    }
}

/// POST /versions (form `id`, `version`)
pub async fn revert_version(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidForm(form): ValidForm<RevertForm>,
) -> Result<Json<EntityInfo>, ApiError> {
    let reverted = state.versions.revert(&ctx, &form.id, form.version).await?;
    Ok(Json(EntityInfo::from_entity(&reverted)))
}
