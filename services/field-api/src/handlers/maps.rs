//! Map tile handler.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use serde::Deserialize;

use analytics::{TileRequest, TileResponse, DEFAULT_FIELD_ID};
use field_common::{MapLayer, PolygonCoordinates};

use super::{require_geometry, today};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MapRequest {
    pub coordinates: Option<PolygonCoordinates>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub field_id: Option<String>,
}

/// POST /api/maps/:layer
///
/// Unknown layers answer 404 before the body is inspected.
pub async fn map_tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
    payload: Result<Json<MapRequest>, JsonRejection>,
) -> ApiResult<Json<TileResponse>> {
    let layer: MapLayer = layer.parse()?;
    let Json(req) = payload?;
    let geometry = require_geometry(req.coordinates)?;
    let period = state.tiles.resolve_period(
        layer,
        req.start_date.as_deref(),
        req.end_date.as_deref(),
        today(),
    )?;

    let field_id = req
        .field_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FIELD_ID.to_string());

    let request = TileRequest {
        layer,
        field_id,
        geometry,
        period,
    };
    Ok(Json(state.tiles.tile(&request).await?))
}
