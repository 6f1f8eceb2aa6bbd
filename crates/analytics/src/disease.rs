//! Disease and pest risk from NDVI decline against the previous window.

use field_common::{AnalysisPeriod, FieldGeometry};
use imagery::{compute_ndvi, Image, ImageProvider, Reducer, RegionStatistics};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, Result};
use crate::stats::{area_share, region_statistics, AreaShare};

/// Risk level derived from the anomalous area share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// `high` above `high_percent`, `medium` above `medium_percent`, else `low`.
    pub fn from_anomaly_percent(percent: f64, medium_percent: f64, high_percent: f64) -> Self {
        if percent > high_percent {
            RiskLevel::High
        } else if percent > medium_percent {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn is_alert(&self) -> bool {
        !matches!(self, RiskLevel::Low)
    }

    /// Points taken off the health score.
    pub fn health_penalty(&self) -> f64 {
        match self {
            RiskLevel::High => 30.0,
            RiskLevel::Medium => 15.0,
            RiskLevel::Low => 5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// NDVI change statistics and the resulting risk level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseRiskReport {
    pub ndvi_change_mean: Option<f64>,
    pub ndvi_change_min: Option<f64>,
    pub ndvi_change_max: Option<f64>,
    pub ndvi_change_stddev: Option<f64>,
    pub anomaly_area_percent: f64,
    pub risk_level: RiskLevel,
    pub alert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_period: Option<AnalysisPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl DiseaseRiskReport {
    fn from_parts(stats: RegionStatistics, share: AreaShare, config: &AnalyticsConfig) -> Self {
        let percent = share.percent();
        let risk_level = RiskLevel::from_anomaly_percent(
            percent,
            config.disease_medium_area_percent,
            config.disease_high_area_percent,
        );
        Self {
            ndvi_change_mean: stats.mean,
            ndvi_change_min: stats.min,
            ndvi_change_max: stats.max,
            ndvi_change_stddev: stats.std_dev,
            anomaly_area_percent: percent,
            risk_level,
            alert: risk_level.is_alert(),
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

/// Current NDVI minus NDVI of the same window moved `shift_days` earlier.
///
/// The shift is fixed, so for windows longer than the shift the two
/// periods overlap. A window that cannot be shifted is rejected before
/// any provider call.
pub async fn ndvi_change_image(
    provider: &dyn ImageProvider,
    geometry: &FieldGeometry,
    period: &AnalysisPeriod,
    shift_days: i64,
) -> Result<Image> {
    let previous_period = period.shifted_back(shift_days)?;
    let current = provider.resolve_image(geometry, period).await?;
    let previous = provider.resolve_image(geometry, &previous_period).await?;
    Ok(compute_ndvi(&current).subtract(&compute_ndvi(&previous)))
}

/// Flag pixels whose NDVI fell by more than the configured sensitivity.
///
/// Provider failures, and a window with no representable previous period,
/// degrade to a low-risk report with a warning.
pub async fn detect_disease_risk(
    provider: &dyn ImageProvider,
    geometry: &FieldGeometry,
    period: &AnalysisPeriod,
    config: &AnalyticsConfig,
) -> DiseaseRiskReport {
    let result = async {
        let change = ndvi_change_image(provider, geometry, period, config.disease_shift_days).await?;
        let stats = region_statistics(provider, &change, geometry, &Reducer::STATISTICS).await?;
        let anomaly = change.lt(-config.disease_sensitivity);
        let share = area_share(provider, &change, &anomaly, geometry).await?;
        Ok::<_, AnalyticsError>((stats, share))
    }
    .await;

    match result {
        Ok((stats, share)) => {
            let report = DiseaseRiskReport::from_parts(stats, share, config);
            if report.warning.is_some() {
                counter!("analytics_degraded_total", "step" => "disease_risk").increment(1);
            }
            debug!(
                anomaly_percent = report.anomaly_area_percent,
                risk_level = %report.risk_level,
                "Disease risk assessed"
            );
            report
        }
        Err(e) => {
            warn!(error = %e, period = %period, "Disease risk detection failed; reporting low risk");
            counter!("analytics_degraded_total", "step" => "disease_risk").increment(1);
            DiseaseRiskReport::degraded(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(percent: f64) -> RiskLevel {
        RiskLevel::from_anomaly_percent(percent, 5.0, 15.0)
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(level(0.0), RiskLevel::Low);
        assert_eq!(level(5.0), RiskLevel::Low);
        assert_eq!(level(5.0001), RiskLevel::Medium);
        assert_eq!(level(15.0), RiskLevel::Medium);
        assert_eq!(level(15.0001), RiskLevel::High);
    }

    #[test]
    fn test_alert_iff_not_low() {
        assert!(!RiskLevel::Low.is_alert());
        assert!(RiskLevel::Medium.is_alert());
        assert!(RiskLevel::High.is_alert());
    }

    #[test]
    fn test_penalties() {
        assert_eq!(RiskLevel::High.health_penalty(), 30.0);
        assert_eq!(RiskLevel::Medium.health_penalty(), 15.0);
        assert_eq!(RiskLevel::Low.health_penalty(), 5.0);
    }

    #[test]
    fn test_risk_level_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RiskLevel::High).unwrap(), "high");
        let parsed: RiskLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, RiskLevel::Medium);
    }

    #[test]
    fn test_report_from_parts() {
        let share = AreaShare {
            selected_pixels: 2.0,
            total_pixels: 10.0,
        };
        let report =
            DiseaseRiskReport::from_parts(RegionStatistics::default(), share, &AnalyticsConfig::default());
        assert_eq!(report.anomaly_area_percent, 20.0);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert!(report.alert);
    }
}
