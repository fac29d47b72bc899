//! Common test utilities for integration tests
//!
//! - Scratch data and upload directories
//! - Initialized store with the bootstrap administrator
//! - Request helpers driving the router with `oneshot`

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use cms_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, JwtConfig, StorageConfig},
};
use cms_shared::{auth::password::PasswordParams, store::BootstrapAdmin};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

const BOUNDARY: &str = "----cms-test-boundary";

/// Test context owning a scratch directory and the built router
pub struct TestContext {
    pub dir: TempDir,
    pub state: AppState,
    pub app: Router,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Creates a context with a freshly initialized store
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            storage: StorageConfig {
                data_dir: dir.path().join("data"),
                upload_dir: dir.path().join("uploads"),
            },
            jwt: JwtConfig {
                secret: SECRET.to_string(),
            },
            admin: BootstrapAdmin {
                params: PasswordParams {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                },
                ..BootstrapAdmin::default()
            },
        };

        let state = AppState::new(config);
        state
            .store
            .initialize(&state.config.admin)
            .await
            .expect("store initializes");
        state.uploads.prepare().await.expect("upload dirs");

        let app = build_router(state.clone());

        Self { dir, state, app }
    }

    /// Sends a request, decoding the body as JSON when possible
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Sends a JSON request with an optional bearer token
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.json(Method::GET, uri, token, None).await
    }

    /// Logs in and returns the token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .json(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Token of the bootstrap administrator
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Uploads one file as multipart form data
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");

        self.send(request).await
    }
}
