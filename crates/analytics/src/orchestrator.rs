//! Public analysis operations composed from the engine parts.

use std::sync::Arc;

use chrono::NaiveDate;
use field_common::{AnalysisPeriod, FieldError, FieldGeometry};
use imagery::{compute_ndvi, ImageProvider, Reducer};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::AnalyticsConfig;
use crate::disease::{detect_disease_risk, DiseaseRiskReport};
use crate::error::Result;
use crate::stats::region_statistics;
use crate::summary::{summarize, CropGrowthReport, FieldSnapshot, FieldSummary, YieldPrediction};
use crate::temporal::{
    classify_trend, compare_historical_seasons, get_time_series_ndvi, HistoricalComparison,
};
use crate::water::{detect_water_stress, WaterStressReport};
use crate::zones::{classify_productivity_zones, ZoneThresholds};

/// Largest `years_back` accepted by historical comparison.
pub const MAX_YEARS_BACK: u32 = 50;

/// Externally visible analysis operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    YieldPrediction,
    WaterStress,
    CropGrowth,
    DiseaseAlert,
    HistoricalComparison,
    FullAnalysis,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::YieldPrediction => "yield_prediction",
            AnalysisKind::WaterStress => "water_stress",
            AnalysisKind::CropGrowth => "crop_growth",
            AnalysisKind::DiseaseAlert => "disease_alert",
            AnalysisKind::HistoricalComparison => "historical_comparison",
            AnalysisKind::FullAnalysis => "full_analysis",
        }
    }

    /// Default window length when the request gives no start date.
    pub fn lookback_days(&self, config: &AnalyticsConfig) -> i64 {
        match self {
            AnalysisKind::CropGrowth => config.growth_lookback_days,
            AnalysisKind::DiseaseAlert => config.disease_lookback_days,
            _ => config.analysis_lookback_days,
        }
    }
}

/// Every analysis for one field plus the folded summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    #[serde(flatten)]
    pub snapshot: FieldSnapshot,
    pub summary: FieldSummary,
}

/// Runs analyses for a field against an image provider.
pub struct FieldAnalyzer {
    provider: Arc<dyn ImageProvider>,
    config: AnalyticsConfig,
}

impl FieldAnalyzer {
    pub fn new(provider: Arc<dyn ImageProvider>, config: AnalyticsConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn ImageProvider> {
        &self.provider
    }

    /// Resolve optional request dates for `kind` against `today`.
    pub fn resolve_period(
        &self,
        kind: AnalysisKind,
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<AnalysisPeriod> {
        Ok(AnalysisPeriod::resolve(
            start,
            end,
            kind.lookback_days(&self.config),
            today,
        )?)
    }

    fn record(kind: AnalysisKind) {
        counter!("analysis_requests_total", "operation" => kind.as_str()).increment(1);
    }

    /// Productivity zones and NDVI statistics over the window.
    ///
    /// Image retrieval and statistics failures propagate; zone
    /// classification degrades to zeros.
    #[instrument(skip(self, geometry, period), fields(period = %period))]
    pub async fn yield_prediction(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<YieldPrediction> {
        Self::record(AnalysisKind::YieldPrediction);
        let mut prediction = self.yield_for(geometry, period).await?;
        prediction.analysis_period = Some(*period);
        Ok(prediction)
    }

    async fn yield_for(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<YieldPrediction> {
        let provider = self.provider.as_ref();
        let image = provider.resolve_image(geometry, period).await?;
        let ndvi = compute_ndvi(&image);

        let ndvi_stats = region_statistics(provider, &ndvi, geometry, &Reducer::STATISTICS).await?;
        let zones = classify_productivity_zones(
            provider,
            &ndvi,
            geometry,
            ZoneThresholds::from(&self.config),
        )
        .await;

        Ok(YieldPrediction {
            zones,
            ndvi_stats,
            analysis_period: None,
        })
    }

    #[instrument(skip(self, geometry, period), fields(period = %period))]
    pub async fn water_stress(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<WaterStressReport> {
        Self::record(AnalysisKind::WaterStress);
        let mut report =
            detect_water_stress(self.provider.as_ref(), geometry, period, &self.config).await;
        report.analysis_period = Some(*period);
        Ok(report)
    }

    /// NDVI time series and trend. `interval_days` is validated and echoed
    /// but the series keeps the provider's capture cadence.
    #[instrument(skip(self, geometry, period), fields(period = %period))]
    pub async fn crop_growth(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
        interval_days: u32,
    ) -> Result<CropGrowthReport> {
        Self::record(AnalysisKind::CropGrowth);
        if interval_days == 0 {
            return Err(FieldError::invalid_parameter("interval_days", "must be positive").into());
        }
        let mut report = self.growth_for(geometry, period).await?;
        report.interval_days = Some(interval_days);
        report.analysis_period = Some(*period);
        Ok(report)
    }

    async fn growth_for(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<CropGrowthReport> {
        let series = get_time_series_ndvi(self.provider.as_ref(), geometry, period).await?;
        let trend = classify_trend(&series, self.config.trend_delta);
        Ok(CropGrowthReport::new(series, trend))
    }

    #[instrument(skip(self, geometry, period), fields(period = %period))]
    pub async fn disease_alert(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
    ) -> Result<DiseaseRiskReport> {
        Self::record(AnalysisKind::DiseaseAlert);
        period.shifted_back(self.config.disease_shift_days)?;
        let mut report =
            detect_disease_risk(self.provider.as_ref(), geometry, period, &self.config).await;
        report.analysis_period = Some(*period);
        Ok(report)
    }

    #[instrument(skip(self, geometry, period), fields(period = %period))]
    pub async fn historical_comparison(
        &self,
        geometry: &FieldGeometry,
        period: &AnalysisPeriod,
        years_back: u32,
    ) -> Result<HistoricalComparison> {
        Self::record(AnalysisKind::HistoricalComparison);
        if years_back == 0 || years_back > MAX_YEARS_BACK {
            return Err(FieldError::invalid_parameter(
                "years_back",
                format!("must be between 1 and {MAX_YEARS_BACK}"),
            )
            .into());
        }
        compare_historical_seasons(self.provider.as_ref(), geometry, period, years_back).await
    }

    /// Run every analysis against windows ending on `today` and fold the summary.
    ///
    /// Any error aborts the whole operation; no partial result is returned.
    #[instrument(skip(self, geometry))]
    pub async fn full_analysis(
        &self,
        geometry: &FieldGeometry,
        today: NaiveDate,
    ) -> Result<FullAnalysis> {
        Self::record(AnalysisKind::FullAnalysis);
        let provider = self.provider.as_ref();
        let current = AnalysisPeriod::trailing(today, self.config.analysis_lookback_days)?;
        let growth_window = AnalysisPeriod::trailing(today, self.config.growth_lookback_days)?;

        let yield_prediction = self.yield_for(geometry, &current).await?;
        let water_stress = detect_water_stress(provider, geometry, &current, &self.config).await;
        let crop_growth = self.growth_for(geometry, &growth_window).await?;
        let disease_risk = detect_disease_risk(provider, geometry, &current, &self.config).await;
        let historical_comparison = compare_historical_seasons(
            provider,
            geometry,
            &current,
            self.config.default_years_back,
        )
        .await?;

        let snapshot = FieldSnapshot {
            yield_prediction: Some(yield_prediction),
            water_stress: Some(water_stress),
            crop_growth: Some(crop_growth),
            disease_risk: Some(disease_risk),
            historical_comparison: Some(historical_comparison),
        };
        let summary = summarize(&snapshot, &self.config);

        info!(
            health_score = summary.overall_health_score,
            alerts = summary.recommendations_count,
            "Full analysis complete"
        );
        Ok(FullAnalysis { snapshot, summary })
    }
}
