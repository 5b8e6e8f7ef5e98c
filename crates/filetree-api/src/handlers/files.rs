//! Folder listing, entity info, creation and content handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use filetree_core::error::AppError;
use filetree_core::types::path::ROOT_PATH;
use filetree_entity::entity::EntityInfo;

use crate::dto::request::{DirectQuery, FilesQuery, MakeForm, PathQuery, TextForm};
use crate::error::ApiError;
use crate::extractors::{CurrentContext, ValidForm, ValidQuery};
use crate::state::AppState;

/// GET /files?id=<path>, or ?source=trash for the trash roots
pub async fn list_files(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<FilesQuery>,
) -> Result<Json<Vec<EntityInfo>>, ApiError> {
    if query.is_trash() {
        let roots = state.trash.list_trash(&ctx).await?;
        return Ok(Json(roots.iter().map(EntityInfo::from_trashed).collect()));
    }

    let folder = query.id.as_deref().unwrap_or(ROOT_PATH);
    let children = state.drive.list(&ctx, folder).await?;
    Ok(Json(children.iter().map(EntityInfo::from_entity).collect()))
}

/// GET /info?id=<path>
pub async fn get_info(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<PathQuery>,
) -> Result<Json<EntityInfo>, ApiError> {
    let entity = state.drive.info(&ctx, &query.id).await?;
    Ok(Json(EntityInfo::from_entity(&entity)))
}

/// POST /makefile (form `id`, `name`)
pub async fn make_file(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidForm(form): ValidForm<MakeForm>,
) -> Result<Json<EntityInfo>, ApiError> {
    let file = state.drive.make(&ctx, &form.id, &form.name, false).await?;
    Ok(Json(EntityInfo::from_entity(&file)))
}

/// POST /makedir (form `id`, `name`)
pub async fn make_dir(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidForm(form): ValidForm<MakeForm>,
) -> Result<Json<EntityInfo>, ApiError> {
    let folder = state.drive.make(&ctx, &form.id, &form.name, true).await?;
    Ok(Json(EntityInfo::from_entity(&folder)))
}

/// GET /text?id=<path>
pub async fn read_text(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<PathQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.drive.read(&ctx, &query.id).await?;
    let text = String::from_utf8_lossy(&data).into_owned();
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// POST /text (form `id`, `content`)
pub async fn write_text(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidForm(form): ValidForm<TextForm>,
) -> Result<Json<EntityInfo>, ApiError> {
    let file = state
        .drive
        .write(&ctx, &form.id, Bytes::from(form.content), None)
        .await?;
    Ok(Json(EntityInfo::from_entity(&file)))
}

/// POST /upload?id=<folder> (multipart field `upload`)
///
/// Creates a new file in the folder and stores the uploaded bytes as its
/// first version.
pub async fn upload(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<PathQuery>,
    mut multipart: Multipart,
) -> Result<Json<EntityInfo>, ApiError> {
    let (name, data) = upload_field(&mut multipart).await?;
    let file = state.drive.make(&ctx, &query.id, &name, false).await?;
    let written = state.drive.write(&ctx, &file.path, data, None).await?;
    Ok(Json(EntityInfo::from_entity(&written)))
}

/// POST /direct?id=<file> (multipart field `upload`)
///
/// Replaces the content of an existing file.
pub async fn replace_content(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<PathQuery>,
    mut multipart: Multipart,
) -> Result<Json<EntityInfo>, ApiError> {
    let (_, data) = upload_field(&mut multipart).await?;
    let written = state.drive.write(&ctx, &query.id, data, None).await?;
    Ok(Json(EntityInfo::from_entity(&written)))
}

/// GET /direct?id=<file>[&download]
pub async fn download(
    State(state): State<AppState>,
    ctx: CurrentContext,
    ValidQuery(query): ValidQuery<DirectQuery>,
) -> Result<Response, ApiError> {
    let (file, stream) = state.drive.open(&ctx, &query.id).await?;
    let disposition = if query.download.is_some() {
        "attachment"
    } else {
        "inline"
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{}\"", file.name),
        )
        .header(header::CONTENT_LENGTH, file.size)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}

/// Reads the `upload` field: its file name and bytes.
async fn upload_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("upload") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("Uploaded file has no name"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Failed to read upload: {e}")))?;
        return Ok((name, data));
    }
    Err(AppError::validation("Missing 'upload' field"))
}
