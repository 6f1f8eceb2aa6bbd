//! Field snapshot and the cross-cutting health summary.

use imagery::RegionStatistics;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::disease::DiseaseRiskReport;
use crate::temporal::{HistoricalComparison, TimeSeriesPoint, Trend};
use crate::water::WaterStressReport;
use crate::zones::ProductivityZones;

/// Productivity zones plus NDVI statistics for the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldPrediction {
    #[serde(flatten)]
    pub zones: ProductivityZones,
    pub ndvi_stats: RegionStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_period: Option<field_common::AnalysisPeriod>,
}

/// NDVI time series and its trend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropGrowthReport {
    pub time_series: Vec<TimeSeriesPoint>,
    pub trend: Trend,
    pub data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_period: Option<field_common::AnalysisPeriod>,
}

impl CropGrowthReport {
    pub fn new(time_series: Vec<TimeSeriesPoint>, trend: Trend) -> Self {
        Self {
            data_points: time_series.len(),
            time_series,
            trend,
            interval_days: None,
            analysis_period: None,
        }
    }

    pub fn latest(&self) -> Option<&TimeSeriesPoint> {
        self.time_series.last()
    }
}

/// Results of any subset of analyses for one field.
///
/// Also the shape accepted by the advisor, so every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yield_prediction: Option<YieldPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_stress: Option<WaterStressReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_growth: Option<CropGrowthReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_risk: Option<DiseaseRiskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_comparison: Option<HistoricalComparison>,
}

impl FieldSnapshot {
    pub fn is_empty(&self) -> bool {
        self.yield_prediction.is_none()
            && self.water_stress.is_none()
            && self.crop_growth.is_none()
            && self.disease_risk.is_none()
            && self.historical_comparison.is_none()
    }
}

pub const LOW_PRODUCTIVITY_ALERT: &str = "High percentage of low productivity areas detected";
pub const IRRIGATION_ALERT: &str = "Irrigation required - significant water stress detected";

/// Health score and alerts folded from whichever sections are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub overall_health_score: f64,
    pub critical_alerts: Vec<String>,
    pub recommendations_count: usize,
}

/// Fold a snapshot into a [`FieldSummary`].
///
/// The health score is the mean of the high-productivity percentage,
/// `(average_moisture + 1) * 50` and `100 - risk penalty`, over the
/// sections present; 0 when none are.
pub fn summarize(snapshot: &FieldSnapshot, config: &AnalyticsConfig) -> FieldSummary {
    let mut alerts = Vec::new();
    let mut factors = Vec::new();

    if let Some(yp) = &snapshot.yield_prediction {
        factors.push(yp.zones.high_productivity_percent);
        if yp.zones.low_productivity_percent > config.low_productivity_alert_percent {
            alerts.push(LOW_PRODUCTIVITY_ALERT.to_string());
        }
    }

    if let Some(ws) = &snapshot.water_stress {
        if ws.requires_irrigation {
            alerts.push(IRRIGATION_ALERT.to_string());
        }
        factors.push((ws.average_moisture_index.unwrap_or(0.0) + 1.0) * 50.0);
    }

    if let Some(dr) = &snapshot.disease_risk {
        if dr.alert {
            alerts.push(format!("Disease/pest risk alert: {} level", dr.risk_level));
        }
        factors.push(100.0 - dr.risk_level.health_penalty());
    }

    let overall_health_score = if factors.is_empty() {
        0.0
    } else {
        factors.iter().sum::<f64>() / factors.len() as f64
    };

    FieldSummary {
        overall_health_score,
        recommendations_count: alerts.len(),
        critical_alerts: alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::RiskLevel;

    fn yield_with(high: f64, low: f64) -> YieldPrediction {
        YieldPrediction {
            zones: ProductivityZones {
                high_productivity_percent: high,
                medium_productivity_percent: 100.0 - high - low,
                low_productivity_percent: low,
                warning: None,
            },
            ..YieldPrediction::default()
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let summary = summarize(&FieldSnapshot::default(), &AnalyticsConfig::default());
        assert_eq!(summary.overall_health_score, 0.0);
        assert!(summary.critical_alerts.is_empty());
        assert_eq!(summary.recommendations_count, 0);
    }

    #[test]
    fn test_health_score_over_present_sections() {
        let snapshot = FieldSnapshot {
            yield_prediction: Some(yield_with(60.0, 10.0)),
            water_stress: Some(WaterStressReport {
                average_moisture_index: Some(0.2),
                ..WaterStressReport::default()
            }),
            ..FieldSnapshot::default()
        };
        let summary = summarize(&snapshot, &AnalyticsConfig::default());
        // (60 + 60) / 2
        assert!((summary.overall_health_score - 60.0).abs() < 1e-9);
        assert!(summary.critical_alerts.is_empty());
    }

    #[test]
    fn test_all_alerts() {
        let snapshot = FieldSnapshot {
            yield_prediction: Some(yield_with(10.0, 50.0)),
            water_stress: Some(WaterStressReport {
                average_moisture_index: Some(-0.2),
                water_stress_area_percent: 45.0,
                requires_irrigation: true,
                ..WaterStressReport::default()
            }),
            disease_risk: Some(DiseaseRiskReport {
                risk_level: RiskLevel::High,
                alert: true,
                ..DiseaseRiskReport::default()
            }),
            ..FieldSnapshot::default()
        };
        let summary = summarize(&snapshot, &AnalyticsConfig::default());
        assert_eq!(
            summary.critical_alerts,
            vec![
                LOW_PRODUCTIVITY_ALERT.to_string(),
                IRRIGATION_ALERT.to_string(),
                "Disease/pest risk alert: high level".to_string(),
            ]
        );
        assert_eq!(summary.recommendations_count, 3);
        // (10 + 40 + 70) / 3
        assert!((summary.overall_health_score - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_productivity_boundary() {
        let snapshot = FieldSnapshot {
            yield_prediction: Some(yield_with(20.0, 40.0)),
            ..FieldSnapshot::default()
        };
        assert!(summarize(&snapshot, &AnalyticsConfig::default())
            .critical_alerts
            .is_empty());
    }

    #[test]
    fn test_snapshot_from_partial_json() {
        let snapshot: FieldSnapshot = serde_json::from_value(serde_json::json!({
            "water_stress": {"water_stress_area_percent": 12.5, "requires_irrigation": false},
            "crop_growth": {"time_series": [{"date": "2025-01-01", "ndvi": 0.4}], "trend": "improving"}
        }))
        .unwrap();
        assert!(!snapshot.is_empty());
        assert_eq!(
            snapshot.water_stress.unwrap().water_stress_area_percent,
            12.5
        );
        let growth = snapshot.crop_growth.unwrap();
        assert_eq!(growth.trend, Trend::Improving);
        assert_eq!(growth.latest().unwrap().ndvi, 0.4);
        assert!(snapshot.yield_prediction.is_none());
    }

    #[test]
    fn test_yield_prediction_flattens_zones() {
        let json = serde_json::to_value(yield_with(70.0, 10.0)).unwrap();
        assert_eq!(json["high_productivity_percent"], 70.0);
        assert!(json.get("zones").is_none());
        assert!(json.get("ndvi_stats").is_some());
    }
}
