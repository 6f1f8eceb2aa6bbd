//! Water stress detection from canopy moisture.

use field_common::{AnalysisPeriod, FieldGeometry};
use imagery::{compute_ndmi, ImageProvider, Reducer, RegionStatistics};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::stats::{area_share, region_statistics, AreaShare};

/// Moisture statistics and the share of the field under water stress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterStressReport {
    pub average_moisture_index: Option<f64>,
    pub min_moisture_index: Option<f64>,
    pub max_moisture_index: Option<f64>,
    pub water_stress_area_percent: f64,
    pub requires_irrigation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_period: Option<AnalysisPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Irrigation is needed only when the stressed share strictly exceeds the limit.
pub fn requires_irrigation(stress_area_percent: f64, limit_percent: f64) -> bool {
    stress_area_percent > limit_percent
}

impl WaterStressReport {
    fn from_parts(stats: RegionStatistics, share: AreaShare, irrigation_limit: f64) -> Self {
        let percent = share.percent();
        Self {
            average_moisture_index: stats.mean,
            min_moisture_index: stats.min,
            max_moisture_index: stats.max,
            water_stress_area_percent: percent,
            requires_irrigation: requires_irrigation(percent, irrigation_limit),
            analysis_period: None,
            warning: (!share.has_valid_pixels())
                .then(|| "no valid pixels in the analysis window".to_string()),
        }
    }

    fn degraded(reason: String) -> Self {
        Self {
            warning: Some(reason),
            ..Self::default()
        }
    }
}

/// Compute NDMI over the window and measure the area below the stress threshold.
///
/// Any provider failure, including image retrieval, degrades to a zero
/// report with a warning.
pub async fn detect_water_stress(
    provider: &dyn ImageProvider,
    geometry: &FieldGeometry,
    period: &AnalysisPeriod,
    config: &AnalyticsConfig,
) -> WaterStressReport {
    let result = async {
        let image = provider.resolve_image(geometry, period).await?;
        let ndmi = compute_ndmi(&image);
        let stats = region_statistics(provider, &ndmi, geometry, &Reducer::MEAN_MIN_MAX).await?;
        let stressed = ndmi.lt(config.water_stress_threshold);
        let share = area_share(provider, &ndmi, &stressed, geometry).await?;
        Ok::<_, imagery::ProviderError>((stats, share))
    }
    .await;

    match result {
        Ok((stats, share)) => {
            let report = WaterStressReport::from_parts(stats, share, config.irrigation_area_percent);
            if report.warning.is_some() {
                counter!("analytics_degraded_total", "step" => "water_stress").increment(1);
            }
            debug!(
                stress_percent = report.water_stress_area_percent,
                requires_irrigation = report.requires_irrigation,
                "Water stress detected"
            );
            report
        }
        Err(e) => {
            warn!(error = %e, period = %period, "Water stress detection failed; returning defaults");
            counter!("analytics_degraded_total", "step" => "water_stress").increment(1);
            WaterStressReport::degraded(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irrigation_boundary() {
        assert!(!requires_irrigation(30.0, 30.0));
        assert!(requires_irrigation(30.0001, 30.0));
        assert!(requires_irrigation(45.0, 30.0));
        assert!(!requires_irrigation(0.0, 30.0));
    }

    #[test]
    fn test_report_from_parts() {
        let stats = RegionStatistics {
            mean: Some(0.1),
            min: Some(-0.2),
            max: Some(0.5),
            std_dev: None,
        };
        let share = AreaShare {
            selected_pixels: 45.0,
            total_pixels: 100.0,
        };
        let report = WaterStressReport::from_parts(stats, share, 30.0);
        assert_eq!(report.water_stress_area_percent, 45.0);
        assert!(report.requires_irrigation);
        assert_eq!(report.average_moisture_index, Some(0.1));
        assert!(report.warning.is_none());
    }

    #[test]
    fn test_empty_region_flags_warning() {
        let report =
            WaterStressReport::from_parts(RegionStatistics::default(), AreaShare::default(), 30.0);
        assert_eq!(report.water_stress_area_percent, 0.0);
        assert!(!report.requires_irrigation);
        assert!(report.warning.is_some());
    }
}
