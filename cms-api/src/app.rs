/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use cms_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(config);
/// state.store.initialize(&state.config.admin).await?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
    routes,
    uploads::UploadStore,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use cms_shared::{
    auth::middleware::{require_user, Authenticator},
    models::media::MediaKind,
    store::CollectionStore,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Room for multipart boundaries and text fields on top of the file limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Collection store
    pub store: CollectionStore,

    /// Uploaded file storage
    pub uploads: UploadStore,

    /// Application configuration
    pub config: Arc<Config>,

    /// Bearer token authentication
    pub authenticator: Authenticator,
}

impl AppState {
    /// Creates state backed by JSON files in the configured data directory
    pub fn new(config: Config) -> Self {
        let store = CollectionStore::json_files(&config.storage.data_dir);
        Self::with_store(config, store)
    }

    /// Creates state around an existing store
    pub fn with_store(config: Config, store: CollectionStore) -> Self {
        let uploads = UploadStore::new(&config.storage.upload_dir);
        let authenticator = Authenticator::new(config.jwt.secret.as_str(), store.clone());

        Self {
            store,
            uploads,
            config: Arc::new(config),
            authenticator,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /api/
/// │   ├── /health                 (public)
/// │   ├── /auth/                  login (public), logout, me
/// │   ├── /users/                 list, get; admin writes
/// │   ├── /blocks/                reads public, writes authenticated
/// │   ├── /forms/                 reads and submit public
/// │   ├── /settings/              read public
/// │   ├── /content/sections/      reads public
/// │   ├── /images/                authenticated
/// │   ├── /videos/                reads public
/// │   ├── /logo/                  read public
/// │   └── /dashboard/             authenticated, backup admin
/// └── /uploads/                   static files
/// ```
///
/// Public and authenticated routes on the same path are merged per method,
/// so `GET /api/blocks` is open while `POST /api/blocks` requires a token.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. Compression
/// 3. CORS (tower-http CorsLayer)
/// 4. Logging (tower-http TraceLayer)
/// 5. Authentication (route layer on protected routes)
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login))
        .route("/blocks", get(routes::blocks::list_blocks))
        .route("/blocks/:id", get(routes::blocks::get_block))
        .route("/forms", get(routes::forms::list_forms))
        .route("/forms/:id", get(routes::forms::get_form))
        .route("/forms/:id/submit", post(routes::forms::submit_form))
        .route("/settings", get(routes::settings::get_settings))
        .route("/content/sections", get(routes::content::list_sections))
        .route("/content/sections/:section", get(routes::content::get_section))
        .route("/videos", get(routes::videos::list_videos))
        .route("/videos/:id", get(routes::videos::get_video))
        .route("/logo", get(routes::logo::get_logo));

    let protected = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        .route("/users", get(routes::users::list_users).post(routes::users::create_user))
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/users/:id/status", patch(routes::users::update_user_status))
        .route("/blocks", post(routes::blocks::create_block))
        .route("/blocks/reorder", put(routes::blocks::reorder_blocks))
        .route(
            "/blocks/:id",
            put(routes::blocks::update_block).delete(routes::blocks::delete_block),
        )
        .route("/forms", post(routes::forms::create_form))
        .route(
            "/forms/:id",
            put(routes::forms::update_form).delete(routes::forms::delete_form),
        )
        .route("/forms/:id/submissions", get(routes::forms::list_submissions))
        .route("/settings", put(routes::settings::update_settings))
        .route("/settings/seo", put(routes::settings::update_seo))
        .route("/content/sections/:section", put(routes::content::update_section))
        .route("/images", get(routes::images::list_images))
        .route(
            "/images/upload",
            post(routes::images::upload_image).layer(upload_limit(MediaKind::Image)),
        )
        .route(
            "/images/:id",
            get(routes::images::get_image)
                .put(routes::images::update_image)
                .delete(routes::images::delete_image),
        )
        .route(
            "/videos/upload",
            post(routes::videos::upload_video).layer(upload_limit(MediaKind::Video)),
        )
        .route(
            "/videos/:id",
            put(routes::videos::update_video).delete(routes::videos::delete_video),
        )
        .route(
            "/logo/upload",
            post(routes::logo::upload_logo).layer(upload_limit(MediaKind::Logo)),
        )
        .route("/logo", delete(routes::logo::delete_logo))
        .route("/dashboard", get(routes::dashboard::overview))
        .route("/dashboard/stats", get(routes::dashboard::stats))
        .route("/dashboard/backup", post(routes::dashboard::backup))
        .route_layer(from_fn_with_state(state.authenticator.clone(), require_user));

    let api = Router::new().merge(public).merge(protected);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn upload_limit(kind: MediaKind) -> DefaultBodyLimit {
    DefaultBodyLimit::max(kind.max_bytes() + MULTIPART_OVERHEAD)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
