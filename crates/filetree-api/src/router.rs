//! Route definitions for the Filetree HTTP API.
//!
//! Routes are organized by domain and merged at the root, matching the
//! paths the file manager client calls. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request logging middleware.
///
/// CORS, compression and tracing are layered on by [`crate::build_app`].
pub fn build_router(state: AppState) -> Router {
    let max_upload =
        usize::try_from(state.config.storage.max_upload_size_bytes).unwrap_or(usize::MAX);

    Router::new()
        .merge(trash_routes())
        .merge(version_routes())
        .merge(file_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Soft delete (`DELETE`), restore (`PUT`) and purge (`POST`)
fn trash_routes() -> Router<AppState> {
    Router::new().route(
        "/delete",
        delete(handlers::trash::delete_entity)
            .put(handlers::trash::restore_entity)
            .post(handlers::trash::purge_entity),
    )
}

/// Version listing, reading and revert
fn version_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/versions",
            get(handlers::version::list_versions).post(handlers::version::revert_version),
        )
        .route("/versions/{id}", get(handlers::version::get_version))
}

/// Listing, info, creation and content
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::files::list_files))
        .route("/info", get(handlers::files::get_info))
        .route("/makefile", post(handlers::files::make_file))
        .route("/makedir", post(handlers::files::make_dir))
        .route(
            "/text",
            get(handlers::files::read_text).post(handlers::files::write_text),
        )
        .route("/upload", post(handlers::files::upload))
        .route(
            "/direct",
            get(handlers::files::download).post(handlers::files::replace_content),
        )
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
