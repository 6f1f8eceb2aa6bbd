//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use storage::MapCacheStats;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "field-api";

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    #[serde(flatten)]
    pub stats: MapCacheStats,
    pub hit_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub image_provider: String,
    pub ai_assistant_configured: bool,
    pub map_cache: CacheHealth,
}

/// GET /api/health
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.map_cache.stats().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        image_provider: state.provider_name.clone(),
        ai_assistant_configured: state.advisor.is_configured(),
        map_cache: CacheHealth {
            hit_rate: stats.hit_rate(),
            stats,
        },
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
