//! Field analysis handlers.
//!
//! Each handler validates the geometry and dates before any provider call,
//! then delegates to the [`FieldAnalyzer`](analytics::FieldAnalyzer).

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use serde::Deserialize;

use analytics::{
    AnalysisKind, CropGrowthReport, DiseaseRiskReport, FullAnalysis, HistoricalComparison,
    WaterStressReport, YieldPrediction,
};
use field_common::PolygonCoordinates;

use super::{require_geometry, today};
use crate::error::ApiResult;
use crate::state::AppState;

/// Body shared by the single-window analyses.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub coordinates: Option<PolygonCoordinates>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CropGrowthRequest {
    pub coordinates: Option<PolygonCoordinates>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub interval_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct HistoricalRequest {
    pub coordinates: Option<PolygonCoordinates>,
    pub current_start: Option<String>,
    pub current_end: Option<String>,
    pub years_back: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct FullAnalysisRequest {
    pub coordinates: Option<PolygonCoordinates>,
}

/// POST /api/yield-prediction
pub async fn yield_prediction_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<YieldPrediction>> {
    let Json(req) = payload?;
    let geometry = require_geometry(req.coordinates)?;
    let period = state.analyzer.resolve_period(
        AnalysisKind::YieldPrediction,
        req.start_date.as_deref(),
        req.end_date.as_deref(),
        today(),
    )?;
    Ok(Json(state.analyzer.yield_prediction(&geometry, &period).await?))
}

/// POST /api/water-stress
pub async fn water_stress_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<WaterStressReport>> {
    let Json(req) = payload?;
    let geometry = require_geometry(req.coordinates)?;
    let period = state.analyzer.resolve_period(
        AnalysisKind::WaterStress,
        req.start_date.as_deref(),
        req.end_date.as_deref(),
        today(),
    )?;
    Ok(Json(state.analyzer.water_stress(&geometry, &period).await?))
}

/// POST /api/crop-growth
pub async fn crop_growth_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<CropGrowthRequest>, JsonRejection>,
) -> ApiResult<Json<CropGrowthReport>> {
    let Json(req) = payload?;
    let geometry = require_geometry(req.coordinates)?;
    let period = state.analyzer.resolve_period(
        AnalysisKind::CropGrowth,
        req.start_date.as_deref(),
        req.end_date.as_deref(),
        today(),
    )?;
    let interval_days = req
        .interval_days
        .unwrap_or(state.analyzer.config().default_interval_days);
    Ok(Json(
        state
            .analyzer
            .crop_growth(&geometry, &period, interval_days)
            .await?,
    ))
}

/// POST /api/disease-alert
pub async fn disease_alert_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<DiseaseRiskReport>> {
    let Json(req) = payload?;
    let geometry = require_geometry(req.coordinates)?;
    let period = state.analyzer.resolve_period(
        AnalysisKind::DiseaseAlert,
        req.start_date.as_deref(),
        req.end_date.as_deref(),
        today(),
    )?;
    Ok(Json(state.analyzer.disease_alert(&geometry, &period).await?))
}

/// POST /api/historical-comparison
pub async fn historical_comparison_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<HistoricalRequest>, JsonRejection>,
) -> ApiResult<Json<HistoricalComparison>> {
    let Json(req) = payload?;
    let geometry = require_geometry(req.coordinates)?;
    let period = state.analyzer.resolve_period(
        AnalysisKind::HistoricalComparison,
        req.current_start.as_deref(),
        req.current_end.as_deref(),
        today(),
    )?;
    let years_back = req
        .years_back
        .unwrap_or(state.analyzer.config().default_years_back);
    Ok(Json(
        state
            .analyzer
            .historical_comparison(&geometry, &period, years_back)
            .await?,
    ))
}

/// POST /api/full-analysis
pub async fn full_analysis_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<FullAnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<FullAnalysis>> {
    let Json(req) = payload?;
    let geometry = require_geometry(req.coordinates)?;
    Ok(Json(state.analyzer.full_analysis(&geometry, today()).await?))
}
