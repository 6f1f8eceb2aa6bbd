//! Field API Service Library
//!
//! HTTP surface over the analytics engine: one POST route per analysis,
//! map tile URLs, the AI assistant, health and Prometheus metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::landing::landing_handler))
        .route("/api/health", get(handlers::health::health_handler))
        .route(
            "/api/yield-prediction",
            post(handlers::analysis::yield_prediction_handler),
        )
        .route(
            "/api/water-stress",
            post(handlers::analysis::water_stress_handler),
        )
        .route(
            "/api/crop-growth",
            post(handlers::analysis::crop_growth_handler),
        )
        .route(
            "/api/disease-alert",
            post(handlers::analysis::disease_alert_handler),
        )
        .route(
            "/api/historical-comparison",
            post(handlers::analysis::historical_comparison_handler),
        )
        .route(
            "/api/full-analysis",
            post(handlers::analysis::full_analysis_handler),
        )
        .route(
            "/api/ai-assistant",
            post(handlers::assistant::ai_assistant_handler),
        )
        .route("/api/maps/:layer", post(handlers::maps::map_tile_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
