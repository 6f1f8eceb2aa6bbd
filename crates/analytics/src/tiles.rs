//! Map tile serving with credential caching.
//!
//! A tile request first looks up the credential cache by
//! (field_id, layer). On a miss the layer image is built, a credential is
//! issued by the provider and stored for the configured TTL.

use std::sync::Arc;

use chrono::NaiveDate;
use field_common::{AnalysisPeriod, FieldGeometry, MapLayer};
use imagery::{
    compute_ndmi, compute_ndvi, Image, ImageProvider, ReduceParams, Reducer, VisualizationParams,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use storage::MapCredentialCache;
use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::disease::ndvi_change_image;
use crate::error::Result;
use crate::zones::{productivity_zone_image, ZoneThresholds};

/// Field identifier used when a request does not name one.
pub const DEFAULT_FIELD_ID: &str = "default";

/// Half-width of the anomaly palette around the field's mean change.
const ANOMALY_PALETTE_RANGE: f64 = 0.3;

/// Tile URL template for one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileResponse {
    pub tile_url: String,
    pub description: String,
    /// True when the credential came from the cache.
    pub cached: bool,
}

/// Tile request for a single layer.
#[derive(Debug, Clone)]
pub struct TileRequest {
    pub layer: MapLayer,
    pub field_id: String,
    pub geometry: FieldGeometry,
    pub period: AnalysisPeriod,
}

/// Default window length for a layer, in days.
pub fn default_lookback_days(layer: MapLayer, config: &AnalyticsConfig) -> i64 {
    match layer {
        MapLayer::Anomaly => config.anomaly_lookback_days,
        _ => config.analysis_lookback_days,
    }
}

/// Serves tile URLs for the map layers.
pub struct MapTileService {
    provider: Arc<dyn ImageProvider>,
    cache: Arc<dyn MapCredentialCache>,
    config: AnalyticsConfig,
}

impl MapTileService {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        cache: Arc<dyn MapCredentialCache>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    /// Resolve request dates for `layer` against its default lookback.
    pub fn resolve_period(
        &self,
        layer: MapLayer,
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<AnalysisPeriod> {
        Ok(AnalysisPeriod::resolve(
            start,
            end,
            default_lookback_days(layer, &self.config),
            today,
        )?)
    }

    /// Cached credential if present, otherwise issue and cache a new one.
    ///
    /// Provider failures propagate; nothing is cached in that case.
    pub async fn tile(&self, request: &TileRequest) -> Result<TileResponse> {
        let layer = request.layer;
        let base_url = &self.config.tiles.base_url;

        if let Some(entry) = self.cache.get(&request.field_id, layer).await {
            counter!("map_cache_hits_total", "layer" => layer.as_str()).increment(1);
            debug!(field_id = %request.field_id, layer = %layer, "Map credential cache hit");
            let credential = imagery::MapCredential {
                map_id: entry.map_id,
                token: entry.token,
            };
            return Ok(TileResponse {
                tile_url: credential.tile_url(base_url),
                description: layer.description().to_string(),
                cached: true,
            });
        }
        counter!("map_cache_misses_total", "layer" => layer.as_str()).increment(1);

        let (image, visualization) = self.render(request).await?;
        let credential = self
            .provider
            .issue_map_credential(&image, &visualization)
            .await?;
        self.cache
            .put(
                &request.field_id,
                layer,
                credential.map_id.clone(),
                credential.token.clone(),
            )
            .await;

        info!(
            field_id = %request.field_id,
            layer = %layer,
            period = %request.period,
            "Issued map credential"
        );
        Ok(TileResponse {
            tile_url: credential.tile_url(base_url),
            description: layer.description().to_string(),
            cached: false,
        })
    }

    async fn render(&self, request: &TileRequest) -> Result<(Image, VisualizationParams)> {
        let provider = self.provider.as_ref();
        let geometry = &request.geometry;

        let rendered = match request.layer {
            MapLayer::Ndvi => {
                let image = provider.resolve_image(geometry, &request.period).await?;
                (
                    compute_ndvi(&image).clip(geometry),
                    VisualizationParams::new(0.0, 1.0, &["red", "yellow", "green"]),
                )
            }
            MapLayer::Moisture => {
                let image = provider.resolve_image(geometry, &request.period).await?;
                (
                    compute_ndmi(&image).clip(geometry),
                    VisualizationParams::new(-1.0, 1.0, &["brown", "yellow", "lightblue", "blue"]),
                )
            }
            MapLayer::Productivity => {
                let image = provider.resolve_image(geometry, &request.period).await?;
                let zones = productivity_zone_image(
                    &compute_ndvi(&image),
                    ZoneThresholds::from(&self.config),
                );
                (
                    zones.clip(geometry),
                    VisualizationParams::new(0.0, 2.0, &["red", "yellow", "green"]),
                )
            }
            MapLayer::Anomaly => {
                let change = ndvi_change_image(
                    provider,
                    geometry,
                    &request.period,
                    self.config.disease_shift_days,
                )
                .await?;
                let values = provider
                    .reduce_region(&change, geometry, &[Reducer::Mean], ReduceParams::anomaly_map())
                    .await?;
                let midpoint = values.get(Reducer::Mean).unwrap_or(0.0);
                (
                    change.clip(geometry),
                    VisualizationParams::new(
                        midpoint - ANOMALY_PALETTE_RANGE,
                        midpoint + ANOMALY_PALETTE_RANGE,
                        &["red", "white", "green"],
                    ),
                )
            }
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookbacks() {
        let config = AnalyticsConfig::default();
        assert_eq!(default_lookback_days(MapLayer::Ndvi, &config), 30);
        assert_eq!(default_lookback_days(MapLayer::Moisture, &config), 30);
        assert_eq!(default_lookback_days(MapLayer::Productivity, &config), 30);
        assert_eq!(default_lookback_days(MapLayer::Anomaly, &config), 15);
    }
}
