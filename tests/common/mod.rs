#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use time::OffsetDateTime;
use tower::ServiceExt;

use wishwall::app::engagement::EngagementService;
use wishwall::app::wishes::WishService;
use wishwall::config::{AppConfig, DEFAULT_UPLOAD_MAX_BYTES};
use wishwall::domain::engagement::Comment;
use wishwall::domain::wish::Wish;
use wishwall::AppState;

pub const ADMIN_TOKEN: &str = "test-admin-token-12345";

const BOUNDARY: &str = "wishwall-test-boundary";

// ---------------------------------------------------------------------------
// TestApp: one isolated database and upload directory per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    // Keeps the database file and uploads alive for the test's duration.
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).into_owned()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

/// A fresh app without an admin token configured.
pub async fn app() -> TestApp {
    TestApp::setup(None).await
}

/// A fresh app that accepts [`ADMIN_TOKEN`].
pub async fn admin_app() -> TestApp {
    TestApp::setup(Some(ADMIN_TOKEN)).await
}

impl TestApp {
    // ------------------------------------------------------------------
    // Setup: the production startup path, pointed at a temp directory
    // ------------------------------------------------------------------
    async fn setup(admin_token: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("cannot create temp dir");

        let config = AppConfig {
            http_addr: ([127, 0, 0, 1], 0).into(),
            database_url: format!("sqlite://{}", dir.path().join("guestbook.db").display()),
            upload_dir: dir.path().join("uploads"),
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            db_max_connections: 5,
            db_connect_timeout_seconds: 30,
            db_busy_timeout_seconds: 30,
            admin_token: admin_token.map(str::to_string),
        };

        let state = AppState::from_config(&config)
            .await
            .expect("AppState::from_config failed");
        let router = wishwall::http::router(state.clone());

        TestApp {
            router,
            state,
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        send(self.router(), request).await
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<(&str, Vec<u8>)>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        for &(key, value) in headers {
            builder = builder.header(key, value);
        }

        let request = match body {
            Some((content_type, bytes)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(bytes))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, &[]).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request(Method::POST, path, None, &[]).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.request(Method::POST, path, Some(("application/json", bytes)), &[])
            .await
    }

    pub async fn post_multipart(&self, path: &str, form: MultipartForm) -> TestResponse {
        let content_type = form.content_type();
        self.request(
            Method::POST,
            path,
            Some((content_type.as_str(), form.finish())),
            &[],
        )
        .await
    }

    pub async fn delete(&self, path: &str, admin_token: Option<&str>) -> TestResponse {
        let mut headers = vec![];
        if let Some(t) = admin_token {
            headers.push(("x-admin-token", t));
        }
        self.request(Method::DELETE, path, None, &headers).await
    }

    /// Posts a plain wish through the form endpoint and returns its id.
    pub async fn post_wish(&self, name: &str, message: &str) -> i64 {
        let resp = self
            .post_multipart(
                "/post-wish",
                MultipartForm::new().text("name", name).text("message", message),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "post_wish failed: {}", resp.text());
        resp.json()["wish"]["id"].as_i64().expect("wish id")
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Insert a wish directly through the service with a chosen timestamp.
    pub async fn insert_wish(&self, name: &str, created_at: OffsetDateTime) -> Wish {
        WishService::new(self.state.db.clone())
            .create_wish(name.to_string(), format!("wish from {}", name), None, created_at)
            .await
            .expect("insert test wish failed")
    }

    pub async fn insert_comment(
        &self,
        wish_id: i64,
        name: &str,
        created_at: OffsetDateTime,
    ) -> Comment {
        EngagementService::new(self.state.db.clone())
            .add_comment(wish_id, name.to_string(), format!("comment from {}", name), created_at)
            .await
            .expect("insert test comment failed")
            .expect("wish exists")
    }

    /// Return the pool for direct DB assertions.
    pub fn pool(&self) -> &SqlitePool {
        self.state.db.pool()
    }

    pub async fn wish_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM wishes")
            .fetch_one(self.pool())
            .await
            .expect("count wishes failed")
    }

    pub async fn comment_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.pool())
            .await
            .expect("count comments failed")
    }

    pub async fn likes_of(&self, wish_id: i64) -> i64 {
        sqlx::query_scalar("SELECT likes FROM wishes WHERE id = ?1")
            .bind(wish_id)
            .fetch_one(self.pool())
            .await
            .expect("read likes failed")
    }

    pub fn upload_dir_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.state.media.dir())
            .expect("cannot read upload dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Drives one request through a router; usable from spawned tasks.
pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.expect("oneshot failed");

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to collect body")
        .to_bytes();

    TestResponse {
        status,
        content_type,
        body_bytes,
    }
}

// ---------------------------------------------------------------------------
// Multipart form builder
// ---------------------------------------------------------------------------

pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}
