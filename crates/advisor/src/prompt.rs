//! Prompt construction from a [`FieldSnapshot`].

use analytics::FieldSnapshot;

pub const SYSTEM_PROMPT: &str = "You are an expert agricultural advisor specializing in precision farming. \
You analyze field data from satellite imagery and provide actionable recommendations to farmers. \
Your advice should be practical, specific, and focused on improving crop yields while optimizing resource usage.";

pub const DEFAULT_QUESTION: &str =
    "Please provide comprehensive recommendations for improving crop health and yield.";

pub const NO_FIELD_DATA: &str = "No field data available.";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Human-readable summary of whichever analyses are present.
///
/// Sections appear in a fixed order. Missing numbers render as 0 and the
/// crop growth section is omitted when its series is empty.
pub fn field_summary(snapshot: &FieldSnapshot) -> String {
    let mut parts = Vec::new();

    if let Some(yp) = &snapshot.yield_prediction {
        parts.push(format!(
            "\nYield Prediction:\n\
             - High productivity areas: {:.1}%\n\
             - Medium productivity areas: {:.1}%\n\
             - Low productivity areas: {:.1}%\n\
             - Average NDVI: {:.3}\n",
            yp.zones.high_productivity_percent,
            yp.zones.medium_productivity_percent,
            yp.zones.low_productivity_percent,
            yp.ndvi_stats.mean.unwrap_or(0.0),
        ));
    }

    if let Some(ws) = &snapshot.water_stress {
        parts.push(format!(
            "\nWater Stress Analysis:\n\
             - Water stress area: {:.1}%\n\
             - Average moisture index: {:.3}\n\
             - Irrigation needed: {}\n",
            ws.water_stress_area_percent,
            ws.average_moisture_index.unwrap_or(0.0),
            yes_no(ws.requires_irrigation),
        ));
    }

    if let Some(dr) = &snapshot.disease_risk {
        parts.push(format!(
            "\nDisease & Pest Risk:\n\
             - Risk level: {}\n\
             - Anomaly area: {:.1}%\n\
             - Alert status: {}\n\
             - NDVI change: {:.3}\n",
            dr.risk_level.as_str().to_uppercase(),
            dr.anomaly_area_percent,
            if dr.alert { "ACTIVE" } else { "None" },
            dr.ndvi_change_mean.unwrap_or(0.0),
        ));
    }

    if let Some(hc) = &snapshot.historical_comparison {
        parts.push(format!(
            "\nHistorical Comparison:\n\
             - Performance vs last year: {}\n\
             - NDVI change: {:.1}%\n\
             - Current mean NDVI: {:.3}\n\
             - Historical mean NDVI: {:.3}\n",
            hc.comparison.performance.as_str().to_uppercase(),
            hc.comparison.percent_change,
            hc.current_season.mean_ndvi.unwrap_or(0.0),
            hc.historical_season.mean_ndvi.unwrap_or(0.0),
        ));
    }

    if let Some(cg) = &snapshot.crop_growth {
        if let Some(latest) = cg.latest() {
            parts.push(format!(
                "\nCrop Growth Tracking:\n\
                 - Latest NDVI: {:.3}\n\
                 - Growth trend: {}\n\
                 - Data points collected: {}\n",
                latest.ndvi,
                cg.trend,
                cg.time_series.len(),
            ));
        }
    }

    if parts.is_empty() {
        NO_FIELD_DATA.to_string()
    } else {
        parts.join("\n")
    }
}

/// User turn: the summary followed by the question, or a default request.
pub fn user_prompt(summary: &str, query: Option<&str>) -> String {
    let question = match query.map(str::trim) {
        Some(q) if !q.is_empty() => format!("User Question: {q}"),
        _ => DEFAULT_QUESTION.to_string(),
    };
    format!("Based on the following field analysis data:\n\n{summary}\n\n{question}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::{
        CropGrowthReport, DiseaseRiskReport, ProductivityZones, RiskLevel, TimeSeriesPoint,
        Trend, WaterStressReport, YieldPrediction,
    };

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(field_summary(&FieldSnapshot::default()), NO_FIELD_DATA);
    }

    #[test]
    fn test_yield_section_formatting() {
        let mut yp = YieldPrediction {
            zones: ProductivityZones {
                high_productivity_percent: 25.0,
                medium_productivity_percent: 37.5,
                low_productivity_percent: 37.5,
                warning: None,
            },
            ..YieldPrediction::default()
        };
        yp.ndvi_stats.mean = Some(0.4567);
        let snapshot = FieldSnapshot {
            yield_prediction: Some(yp),
            ..FieldSnapshot::default()
        };
        let text = field_summary(&snapshot);
        assert!(text.contains("- High productivity areas: 25.0%"));
        assert!(text.contains("- Medium productivity areas: 37.5%"));
        assert!(text.contains("- Average NDVI: 0.457"));
    }

    #[test]
    fn test_water_and_disease_sections() {
        let snapshot = FieldSnapshot {
            water_stress: Some(WaterStressReport {
                average_moisture_index: Some(0.1),
                water_stress_area_percent: 45.0,
                requires_irrigation: true,
                ..WaterStressReport::default()
            }),
            disease_risk: Some(DiseaseRiskReport {
                anomaly_area_percent: 20.0,
                risk_level: RiskLevel::High,
                alert: true,
                ndvi_change_mean: None,
                ..DiseaseRiskReport::default()
            }),
            ..FieldSnapshot::default()
        };
        let text = field_summary(&snapshot);
        assert!(text.contains("- Irrigation needed: Yes"));
        assert!(text.contains("- Risk level: HIGH"));
        assert!(text.contains("- Alert status: ACTIVE"));
        assert!(text.contains("- NDVI change: 0.000"));
        assert!(text.find("Water Stress").unwrap() < text.find("Disease & Pest").unwrap());
    }

    #[test]
    fn test_crop_growth_needs_points() {
        let empty = FieldSnapshot {
            crop_growth: Some(CropGrowthReport::default()),
            ..FieldSnapshot::default()
        };
        assert_eq!(field_summary(&empty), NO_FIELD_DATA);

        let growing = FieldSnapshot {
            crop_growth: Some(CropGrowthReport::new(
                vec![
                    TimeSeriesPoint {
                        date: "2025-06-01".to_string(),
                        ndvi: 0.3,
                    },
                    TimeSeriesPoint {
                        date: "2025-06-11".to_string(),
                        ndvi: 0.55,
                    },
                ],
                Trend::Improving,
            )),
            ..FieldSnapshot::default()
        };
        let text = field_summary(&growing);
        assert!(text.contains("- Latest NDVI: 0.550"));
        assert!(text.contains("- Growth trend: improving"));
        assert!(text.contains("- Data points collected: 2"));
    }

    #[test]
    fn test_user_prompt() {
        let with_query = user_prompt("S", Some("When should I irrigate?"));
        assert_eq!(
            with_query,
            "Based on the following field analysis data:\n\nS\n\nUser Question: When should I irrigate?"
        );
        assert!(user_prompt("S", None).ends_with(DEFAULT_QUESTION));
        assert!(user_prompt("S", Some("  ")).ends_with(DEFAULT_QUESTION));
    }
}
