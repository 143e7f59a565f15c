use axum::{Json, extract::Path, extract::State, response::IntoResponse};
use tracing::info;

use super::models::{GalleryResponse, HealthResponse};
use super::state::AppState;
use crate::gallery::BreakerState;

/// Gallery listing endpoint (GET /galerias/{gallery})
///
/// Resolution is total: every failure inside the resolver has a fallback
/// value, so this handler always answers `200 OK`. Unknown galleries yield
/// an empty image list.
pub async fn get_gallery(
    State(state): State<AppState>,
    Path(gallery): Path<String>,
) -> impl IntoResponse {
    let images = state.resolver.resolve(&gallery).await;

    Json(GalleryResponse {
        count: images.len(),
        gallery,
        images,
    })
}

/// Breaker introspection endpoint (GET /operators/breaker)
pub async fn breaker_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.breaker.stats())
}

/// Manual breaker recovery endpoint (POST /operators/breaker/reset)
///
/// Forces the breaker CLOSED with a zero failure count. Operator action,
/// not part of the normal resolution flow.
pub async fn reset_breaker(State(state): State<AppState>) -> impl IntoResponse {
    state.breaker.reset();
    info!("circuit breaker reset via operator endpoint");
    Json(state.breaker.stats())
}

/// Metrics snapshot endpoint (GET /operators/metrics)
pub async fn metrics_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Health check endpoint (GET /health)
///
/// The service keeps answering gallery requests with fallbacks while the
/// breaker is open, so an open breaker reports "degraded" rather than
/// failing the check.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    use std::collections::HashMap;

    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());

    let breaker_health = match state.breaker.stats().state {
        BreakerState::Open => "degraded",
        BreakerState::Closed | BreakerState::HalfOpen => "healthy",
    };
    components.insert("breaker".to_string(), breaker_health.to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let overall_status = if all_healthy { "healthy" } else { "degraded" };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(response)
}
