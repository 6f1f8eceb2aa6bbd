//! Productivity zone classification.

use field_common::FieldGeometry;
use imagery::{Image, ImageProvider};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::stats::{mask_sum, pixel_count, safe_percent};

/// NDVI cut-offs separating low, medium and high productivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            high: 0.6,
            medium: 0.4,
        }
    }
}

impl From<&AnalyticsConfig> for ZoneThresholds {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            high: config.ndvi_high_threshold,
            medium: config.ndvi_medium_threshold,
        }
    }
}

/// Share of the field in each productivity zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductivityZones {
    pub high_productivity_percent: f64,
    pub medium_productivity_percent: f64,
    pub low_productivity_percent: f64,
    /// Why the percentages are zero, when they were not computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ProductivityZones {
    fn degraded(reason: String) -> Self {
        Self {
            warning: Some(reason),
            ..Self::default()
        }
    }
}

/// 0/1/2 image of low/medium/high zones, used for the productivity map.
pub fn productivity_zone_image(ndvi: &Image, thresholds: ZoneThresholds) -> Image {
    ndvi.gte(thresholds.medium)
        .add(&ndvi.gte(thresholds.high))
        .rename("zone")
}

/// Partition an NDVI image into productivity zones.
///
/// Each zone mask is summed independently and divided by the valid-pixel
/// count. A provider failure or an empty region yields all zeros with a
/// warning instead of an error.
pub async fn classify_productivity_zones(
    provider: &dyn ImageProvider,
    ndvi: &Image,
    geometry: &FieldGeometry,
    thresholds: ZoneThresholds,
) -> ProductivityZones {
    let high_mask = ndvi.gte(thresholds.high);
    let medium_mask = ndvi.gte(thresholds.medium).and(&ndvi.lt(thresholds.high));
    let low_mask = ndvi.lt(thresholds.medium);

    let result = async {
        let total = pixel_count(provider, ndvi, geometry).await?;
        let high = mask_sum(provider, &high_mask, geometry).await?;
        let medium = mask_sum(provider, &medium_mask, geometry).await?;
        let low = mask_sum(provider, &low_mask, geometry).await?;
        Ok::<_, imagery::ProviderError>((total, high, medium, low))
    }
    .await;

    match result {
        Ok((total, _, _, _)) if total <= 0.0 => {
            warn!("No valid NDVI pixels in field; zone percentages set to zero");
            counter!("analytics_degraded_total", "step" => "zones").increment(1);
            ProductivityZones::degraded("no valid pixels in the analysis window".to_string())
        }
        Ok((total, high, medium, low)) => {
            debug!(total, high, medium, low, "Classified productivity zones");
            ProductivityZones {
                high_productivity_percent: safe_percent(high, total),
                medium_productivity_percent: safe_percent(medium, total),
                low_productivity_percent: safe_percent(low, total),
                warning: None,
            }
        }
        Err(e) => {
            warn!(error = %e, "Zone classification failed; returning zero percentages");
            counter!("analytics_degraded_total", "step" => "zones").increment(1);
            ProductivityZones::degraded(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagery::{compute_ndvi, ImageExpr};

    #[test]
    fn test_zone_image_sums_two_masks() {
        let ndvi = compute_ndvi(&Image::source("s"));
        let zones = productivity_zone_image(&ndvi, ZoneThresholds::default());
        match zones.expr() {
            ImageExpr::Rename { input, name } => {
                assert_eq!(name, "zone");
                assert!(matches!(input.as_ref(), ImageExpr::Arithmetic { .. }));
            }
            other => panic!("unexpected root: {:?}", other),
        }
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = AnalyticsConfig {
            ndvi_high_threshold: 0.7,
            ..AnalyticsConfig::default()
        };
        let thresholds = ZoneThresholds::from(&config);
        assert_eq!(thresholds.high, 0.7);
        assert_eq!(thresholds.medium, 0.4);
    }
}
