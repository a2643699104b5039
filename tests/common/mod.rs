//! Shared helpers for HTTP API tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderName, StatusCode};
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tempfile::TempDir;

use filevault::web::{create_router, AppState};
use filevault::{Config, Database};

/// Header carrying the session token.
pub const X_TOKEN: HeaderName = HeaderName::from_static("x-token");

/// A router under test plus the resources backing it.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub config: Config,
    _blobs: TempDir,
}

/// Create a test configuration with blobs under `dir`.
pub fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.files.storage_path = dir.path().to_string_lossy().into_owned();
    config.files.max_upload_size_mb = 1;
    config.auth.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config
}

/// Create a test server with an in-memory database.
pub async fn create_test_app() -> TestApp {
    let blobs = TempDir::new().expect("Failed to create blob directory");
    let config = create_test_config(&blobs);

    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let (app_state, _worker) =
        AppState::from_config(db.clone(), &config).expect("Failed to build app state");

    let router = create_router(
        Arc::new(app_state),
        &config.server.cors_origins,
        config.files.max_upload_bytes(),
    );
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        config,
        _blobs: blobs,
    }
}

/// Basic credentials header value.
pub fn basic_auth(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

/// Register a user and return the response body.
pub async fn register_user(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/users")
        .json(&json!({ "email": email, "password": password }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

/// Open a session and return its token.
pub async fn connect(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .get("/connect")
        .add_header(AUTHORIZATION, basic_auth(email, password))
        .await;

    response.assert_status_ok();
    response.json::<Value>()["token"]
        .as_str()
        .expect("token missing")
        .to_string()
}

/// Register a user, connect, and return `(user_id, token)`.
pub async fn signed_in_user(server: &TestServer, email: &str) -> (i64, String) {
    let user = register_user(server, email, "toto1234!").await;
    let token = connect(server, email, "toto1234!").await;
    (user["id"].as_i64().expect("id missing"), token)
}

/// Create a node and return the response body.
pub async fn create_node(server: &TestServer, token: &str, body: Value) -> Value {
    let response = server
        .post("/files")
        .add_header(X_TOKEN, token.to_string())
        .json(&body)
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}
