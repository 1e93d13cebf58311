//! Application builder — wires state, router, and middleware into an Axum
//! app and runs the server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use console_auth::client::{AuthClient, TokenExchange};
use console_auth::refresh::RefreshCoordinator;
use console_auth::store::CredentialStore;
use console_core::config::AppConfig;
use console_core::error::ErrorKind;
use console_core::{AppError, AppResult};

use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;
use crate::upstream::UpstreamClient;

/// Builds the shared application state from configuration.
///
/// All collaborators are constructed here and injected; nothing is a global
/// singleton, so tests can assemble the same state against a stub upstream.
pub fn build_state(config: Arc<AppConfig>) -> AppResult<AppState> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.request_timeout_seconds))
        .build()
        .map_err(|err| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("failed to build the upstream HTTP client: {err}"),
                err,
            )
        })?;

    let auth: Arc<dyn TokenExchange> = Arc::new(AuthClient::new(
        http.clone(),
        config.upstream.base_url.clone(),
    ));
    let coordinator = Arc::new(RefreshCoordinator::new(
        Arc::clone(&auth),
        chrono::Duration::seconds(config.auth.refresh_margin_seconds),
    ));
    let upstream = Arc::new(UpstreamClient::new(
        http,
        config.upstream.base_url.clone(),
        coordinator,
    ));
    let store = CredentialStore::new(config.auth.cookie_name.clone(), config.auth.cookie_secure);

    Ok(AppState {
        config,
        store,
        auth,
        upstream,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}

/// Runs the console gateway with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    let config = Arc::new(config);
    let state = build_state(Arc::clone(&config))?;
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %addr,
        upstream = %config.upstream.base_url,
        "console gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install the shutdown handler");
        return;
    }
    info!("shutdown signal received");
}
