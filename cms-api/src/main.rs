//! # CMS API Server
//!
//! Serves the CMS REST API under `/api` and uploaded media under `/uploads`.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p cms-api
//! ```

use anyhow::Context;
use cms_api::{
    app::{build_router, AppState},
    config::Config,
};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("CMS API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    let address = config.bind_address();
    let state = AppState::new(config);

    let report = state
        .store
        .initialize(&state.config.admin)
        .await
        .context("Failed to initialize data store")?;
    tracing::info!(
        collections = report.sizes.len(),
        admin_created = report.admin_created,
        "Data store ready"
    );

    state
        .uploads
        .prepare()
        .await
        .context("Failed to create upload directories")?;

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cms_api=debug,cms_shared=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, exiting...");
}
