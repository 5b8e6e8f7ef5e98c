//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use filetree_core::config::AppConfig;
use filetree_core::traits::storage::StorageProvider;
use filetree_database::DatabasePool;
use filetree_database::repositories::{EditRepository, EntityRepository, MarkerRepository};
use filetree_service::{DriveService, EditRecorder, TrashService, VersionService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db: DatabasePool,
    /// Content blob storage
    pub storage: Arc<dyn StorageProvider>,

    // ── Services ─────────────────────────────────────────────
    /// Content lookups and writes
    pub drive: Arc<DriveService>,
    /// Soft delete, restore and purge
    pub trash: Arc<TrashService>,
    /// Version history
    pub versions: Arc<VersionService>,
}

impl AppState {
    /// Wires repositories and services on top of a pool and a blob store.
    pub fn new(config: AppConfig, db: DatabasePool, storage: Arc<dyn StorageProvider>) -> Self {
        let entity_repo = Arc::new(EntityRepository::new());
        let edit_repo = Arc::new(EditRepository::new());
        let marker_repo = Arc::new(MarkerRepository::new());

        let recorder = Arc::new(EditRecorder::new(Arc::clone(&edit_repo)));
        let drive = Arc::new(DriveService::new(
            db.clone(),
            Arc::clone(&storage),
            Arc::clone(&entity_repo),
            recorder,
        ));
        let trash = Arc::new(TrashService::new(
            db.clone(),
            Arc::clone(&entity_repo),
            marker_repo,
            config.trash.clone(),
        ));
        let versions = Arc::new(VersionService::new(
            db.clone(),
            Arc::clone(&drive),
            edit_repo,
            config.versions.clone(),
        ));

        Self {
            config: Arc::new(config),
            db,
            storage,
            drive,
            trash,
            versions,
        }
    }
}
