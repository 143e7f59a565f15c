use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{breaker_stats, get_gallery, health, metrics_snapshot, reset_breaker},
    state::AppState,
};
use crate::config::Config;
use crate::gallery::{
    AssetLayout, AssetRegistry, AssetValidator, CircuitBreaker, HttpGalleryApi, HttpProber,
    HybridResolver, RemoteLoader,
};
use crate::observability::Metrics;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the application router over an assembled state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/galerias/{gallery}", get(get_gallery))
        .route("/operators/breaker", get(breaker_stats))
        .route("/operators/breaker/reset", post(reset_breaker))
        .route("/operators/metrics", get(metrics_snapshot))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(address: SocketAddr) -> Result<(), AnyError> {
    // Load config
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;

    // Load the asset manifest produced by the sync job
    info!(path = %config.assets.manifest_path.display(), "Loading asset manifest");
    let registry = AssetRegistry::from_manifest_file(
        &config.assets.manifest_path,
        AssetLayout {
            public_prefix: config.assets.public_prefix.clone(),
            default_width: config.assets.default_width,
            default_height: config.assets.default_height,
        },
    )
    .map_err(|e| format!("Failed to load asset manifest: {}", e))?;

    // One breaker instance guards the whole remote dependency
    let breaker = Arc::new(CircuitBreaker::new(
        config.breaker.failure_threshold,
        config.breaker.open_timeout(),
    ));

    let prober = Arc::new(HttpProber::new(
        config.validator.probe_base_url.clone(),
        config.validator.probe_timeout(),
    ));
    let validator = AssetValidator::new(prober, config.validator.batch_size);

    let api = Arc::new(HttpGalleryApi::new(
        config.remote.base_url.clone(),
        config.remote.request_timeout(),
        config.remote.page,
        config.remote.per_page,
    ));
    let remote = RemoteLoader::new(api, Arc::clone(&breaker));

    let metrics = Arc::new(Metrics::new());
    let resolver = Arc::new(HybridResolver::new(
        Arc::new(registry),
        validator,
        remote,
        Arc::clone(&metrics),
    ));

    let state = AppState::new(config, resolver, breaker, metrics);
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "galeria API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
