//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bytes::Bytes;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use filetree_api::{AppState, build_app};
use filetree_core::config::AppConfig;
use filetree_database::DatabasePool;
use filetree_database::repositories::EntityRepository;
use filetree_entity::entity::{Entity, EntityKind};
use filetree_service::RequestContext;
use filetree_storage::LocalStorageProvider;

/// Side-table rows referencing one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerCounts {
    pub favorites: i64,
    pub tags: i64,
    pub shares: i64,
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared services
    pub state: AppState,
    /// Context used for direct service calls
    pub ctx: RequestContext,
    /// The tree root
    pub root: Entity,
    /// Keeps the blob directory alive
    _blobs: TempDir,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a new test application
    pub async fn with_config(config: AppConfig) -> Self {
        Self::build(config, false).await
    }

    /// Create a test application over a WAL database file with a pool of
    /// several connections, so transactions really run side by side
    pub async fn file_backed() -> Self {
        Self::build(AppConfig::default(), true).await
    }

    async fn build(mut config: AppConfig, file_backed: bool) -> Self {
        let blobs = tempfile::tempdir().expect("Failed to create blob dir");
        config.storage.data_root = blobs.path().to_string_lossy().into_owned();

        let db = if file_backed {
            config.database.url = format!("sqlite://{}/filetree.db", blobs.path().display());
            config.database.max_connections = 8;
            DatabasePool::connect(&config.database).await
        } else {
            DatabasePool::connect_in_memory().await
        }
        .expect("Failed to open test database");
        filetree_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let storage = LocalStorageProvider::new(&config.storage.data_root)
            .await
            .expect("Failed to init storage");

        let state = AppState::new(config.clone(), db, Arc::new(storage));
        let root = state
            .drive
            .ensure_root(config.context.default_tree_id)
            .await
            .expect("Failed to create root");

        let ctx = RequestContext::from_config(&config.context, config.storage.readonly);
        let router = build_app(state.clone(), &config.server.cors);

        Self {
            router,
            state,
            ctx,
            root,
            _blobs: blobs,
        }
    }

    /// A router over the same data that rejects every mutation
    pub fn readonly_router(&self) -> Router {
        let mut config = (*self.state.config).clone();
        config.storage.readonly = true;
        let state = AppState::new(
            config.clone(),
            self.state.db.clone(),
            Arc::clone(&self.state.storage),
        );
        build_app(state, &config.server.cors)
    }

    /// Tree all test entities live in
    pub fn tree(&self) -> i64 {
        self.ctx.tree_id
    }

    /// Create a folder
    pub async fn mkdir(&self, parent: &str, name: &str) -> Entity {
        self.state
            .drive
            .make(&self.ctx, parent, name, true)
            .await
            .expect("Failed to create folder")
    }

    /// Create a file with content (one recorded version)
    pub async fn mkfile(&self, parent: &str, name: &str, content: &str) -> Entity {
        let file = self
            .state
            .drive
            .make(&self.ctx, parent, name, false)
            .await
            .expect("Failed to create file");
        self.write(&file.path, content).await
    }

    /// Write new content to a file
    pub async fn write(&self, path: &str, content: &str) -> Entity {
        self.state
            .drive
            .write(&self.ctx, path, Bytes::from(content.to_string()), None)
            .await
            .expect("Failed to write file")
    }

    /// Insert a row with a fixed id, bypassing the services
    pub async fn insert_entity(
        &self,
        id: i64,
        path: &str,
        folder: i64,
        kind: EntityKind,
    ) -> Entity {
        let name = path.rsplit('/').next().unwrap_or_default();
        sqlx::query(
            "INSERT INTO entity (id, tree, path, name, folder, type, content, size, modified)
             VALUES (?, ?, ?, ?, ?, ?, '', 0, ?)",
        )
        .bind(id)
        .bind(self.tree())
        .bind(path)
        .bind(name)
        .bind(folder)
        .bind(kind)
        .bind(chrono::Utc::now())
        .execute(self.state.db.pool())
        .await
        .expect("Failed to insert entity");
        self.entity(id).await.expect("Inserted entity is missing")
    }

    /// Look up any entity (active or trashed) by id
    pub async fn entity(&self, id: i64) -> Option<Entity> {
        EntityRepository::new()
            .find_by_id(self.state.db.pool(), self.tree(), id)
            .await
            .expect("Failed to look up entity")
    }

    /// Every row of the tree as `(id, path, name, folder)`, by id
    pub async fn snapshot(&self) -> Vec<(i64, String, String, i64)> {
        sqlx::query_as("SELECT id, path, name, folder FROM entity WHERE tree = ? ORDER BY id")
            .bind(self.tree())
            .fetch_all(self.state.db.pool())
            .await
            .expect("Failed to read entities")
    }

    /// Number of edits recorded for an entity, purged or not
    pub async fn edit_count(&self, entity_id: i64) -> i64 {
        self.scalar("SELECT COUNT(*) FROM entity_edit WHERE entity_id = ?", entity_id)
            .await
    }

    /// Mark an entity as a favorite of `user_id`
    pub async fn add_favorite(&self, user_id: i64, entity_id: i64) {
        sqlx::query("INSERT INTO favorite (user_id, entity_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(entity_id)
            .execute(self.state.db.pool())
            .await
            .expect("Failed to add favorite");
    }

    /// Create a tag in the test tree
    pub async fn create_tag(&self, name: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("INSERT INTO tag (tree, name) VALUES (?, ?) RETURNING id")
            .bind(self.tree())
            .bind(name)
            .fetch_one(self.state.db.pool())
            .await
            .expect("Failed to create tag")
    }

    /// Attach a tag to an entity
    pub async fn tag_entity(&self, entity_id: i64, tag_id: i64) {
        sqlx::query("INSERT INTO entity_tag (entity_id, tag_id) VALUES (?, ?)")
            .bind(entity_id)
            .bind(tag_id)
            .execute(self.state.db.pool())
            .await
            .expect("Failed to tag entity");
    }

    /// Share an entity with `user_id`
    pub async fn share_entity(&self, entity_id: i64, user_id: i64) {
        sqlx::query("INSERT INTO entity_user (entity_id, user_id) VALUES (?, ?)")
            .bind(entity_id)
            .bind(user_id)
            .execute(self.state.db.pool())
            .await
            .expect("Failed to share entity");
    }

    /// Side-table rows referencing an entity
    pub async fn marker_counts(&self, entity_id: i64) -> MarkerCounts {
        MarkerCounts {
            favorites: self
                .scalar("SELECT COUNT(*) FROM favorite WHERE entity_id = ?", entity_id)
                .await,
            tags: self
                .scalar("SELECT COUNT(*) FROM entity_tag WHERE entity_id = ?", entity_id)
                .await,
            shares: self
                .scalar("SELECT COUNT(*) FROM entity_user WHERE entity_id = ?", entity_id)
                .await,
        }
    }

    async fn scalar(&self, sql: &str, id: i64) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(id)
            .fetch_one(self.state.db.pool())
            .await
            .expect("Failed to run count query")
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, uri: &str, form: Option<&str>) -> TestResponse {
        send(&self.router, method, uri, form).await
    }

    /// Send a multipart upload with a single `upload` field
    pub async fn upload(&self, uri: &str, file_name: &str, data: &str) -> TestResponse {
        let boundary = "filetree-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"upload\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {data}\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        into_test_response(&self.router, req).await
    }
}

/// Send a request to any router
pub async fn send(router: &Router, method: &str, uri: &str, form: Option<&str>) -> TestResponse {
    let mut req = Request::builder().method(method).uri(uri);
    if form.is_some() {
        req = req.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    }
    let req = req
        .body(Body::from(form.unwrap_or_default().to_string()))
        .expect("Failed to build request");
    into_test_response(router, req).await
}

async fn into_test_response(router: &Router, req: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        text: String::from_utf8_lossy(&body_bytes).into_owned(),
        body,
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: axum::http::HeaderMap,
    /// Raw body as text
    pub text: String,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
}

impl TestResponse {
    /// The `code` of an error body
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }
}
