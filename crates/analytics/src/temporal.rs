//! NDVI time series, growth trend and season-over-season comparison.

use field_common::{AnalysisPeriod, FieldGeometry};
use futures::future::try_join_all;
use imagery::{compute_ndvi, ImageProvider, ReduceParams, Reducer, RegionStatistics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::stats::{region_statistics, safe_percent};

/// Region-mean NDVI of one capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub ndvi: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: impl Into<String>, ndvi: f64) -> Self {
        Self {
            date: date.into(),
            ndvi,
        }
    }
}

/// Direction of NDVI change over a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mean NDVI per cloud-filtered capture, ascending by date.
///
/// Captures with no valid pixel over the field produce no point. Points
/// sharing a date are all kept. The provider's capture cadence is used
/// as-is.
pub async fn get_time_series_ndvi(
    provider: &dyn ImageProvider,
    geometry: &FieldGeometry,
    period: &AnalysisPeriod,
) -> imagery::Result<Vec<TimeSeriesPoint>> {
    let captures = provider.list_captures(geometry, period).await?;

    let means = try_join_all(captures.iter().map(|capture| async move {
        let values = provider
            .reduce_region(
                &compute_ndvi(&capture.image),
                geometry,
                &[Reducer::Mean],
                ReduceParams::index(),
            )
            .await?;
        Ok::<_, imagery::ProviderError>(values.get(Reducer::Mean))
    }))
    .await?;

    let mut series: Vec<TimeSeriesPoint> = captures
        .iter()
        .zip(means)
        .filter_map(|(capture, mean)| {
            mean.map(|ndvi| TimeSeriesPoint::new(capture.date.format("%Y-%m-%d").to_string(), ndvi))
        })
        .collect();
    series.sort_by(|a, b| a.date.cmp(&b.date));

    debug!(
        captures = captures.len(),
        points = series.len(),
        "Built NDVI time series"
    );
    Ok(series)
}

/// Compare the last and first points against `delta`.
///
/// Fewer than two points is `Stable`.
pub fn classify_trend(series: &[TimeSeriesPoint], delta: f64) -> Trend {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => (first, last),
        _ => return Trend::Stable,
    };
    let change = last.ndvi - first.ndvi;
    if change > delta {
        Trend::Improving
    } else if change < -delta {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// NDVI statistics of one season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonStatistics {
    pub start_date: String,
    pub end_date: String,
    pub mean_ndvi: Option<f64>,
    pub min_ndvi: Option<f64>,
    pub max_ndvi: Option<f64>,
}

impl SeasonStatistics {
    fn new(period: &AnalysisPeriod, stats: RegionStatistics) -> Self {
        Self {
            start_date: period.start_str(),
            end_date: period.end_str(),
            mean_ndvi: stats.mean,
            min_ndvi: stats.min,
            max_ndvi: stats.max,
        }
    }
}

/// Current versus historical outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    Better,
    Worse,
    #[default]
    Similar,
}

impl Performance {
    pub fn from_difference(difference: f64) -> Self {
        if difference > 0.0 {
            Performance::Better
        } else if difference < 0.0 {
            Performance::Worse
        } else {
            Performance::Similar
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Performance::Better => "better",
            Performance::Worse => "worse",
            Performance::Similar => "similar",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonComparison {
    pub ndvi_difference: f64,
    pub percent_change: f64,
    pub performance: Performance,
}

impl SeasonComparison {
    /// A missing mean counts as 0 in the difference; percent change is 0
    /// when the historical mean is 0 or missing.
    pub fn from_means(current: Option<f64>, historical: Option<f64>) -> Self {
        let ndvi_difference = current.unwrap_or(0.0) - historical.unwrap_or(0.0);
        let percent_change = safe_percent(ndvi_difference, historical.unwrap_or(0.0));
        Self {
            ndvi_difference,
            percent_change,
            performance: Performance::from_difference(ndvi_difference),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalComparison {
    pub current_season: SeasonStatistics,
    pub historical_season: SeasonStatistics,
    pub comparison: SeasonComparison,
}

/// Days the historical window is shifted for `years_back` years.
///
/// Plain 365-day years: no leap-day adjustment.
pub fn historical_shift_days(years_back: u32) -> i64 {
    365 * i64::from(years_back)
}

/// Compare NDVI over `period` with the same window `years_back` years earlier.
///
/// A historical window outside the calendar is a validation error raised
/// before any provider call.
pub async fn compare_historical_seasons(
    provider: &dyn ImageProvider,
    geometry: &FieldGeometry,
    period: &AnalysisPeriod,
    years_back: u32,
) -> Result<HistoricalComparison> {
    let historical_period = period.shifted_back(historical_shift_days(years_back))?;

    let current_image = provider.resolve_image(geometry, period).await?;
    let current = region_statistics(
        provider,
        &compute_ndvi(&current_image),
        geometry,
        &Reducer::STATISTICS,
    )
    .await?;

    let historical_image = provider.resolve_image(geometry, &historical_period).await?;
    let historical = region_statistics(
        provider,
        &compute_ndvi(&historical_image),
        geometry,
        &Reducer::STATISTICS,
    )
    .await?;

    let comparison = SeasonComparison::from_means(current.mean, historical.mean);
    debug!(
        current = %period,
        historical = %historical_period,
        difference = comparison.ndvi_difference,
        "Compared seasons"
    );

    Ok(HistoricalComparison {
        current_season: SeasonStatistics::new(period, current),
        historical_season: SeasonStatistics::new(&historical_period, historical),
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[(&str, f64)]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .map(|(d, v)| TimeSeriesPoint::new(*d, *v))
            .collect()
    }

    fn two_points(change: f64) -> Vec<TimeSeriesPoint> {
        series(&[("2025-01-01", 0.5), ("2025-02-01", 0.5 + change)])
    }

    #[test]
    fn test_trend_improving_example() {
        let s = series(&[("2025-01-01", 0.3), ("2025-02-01", 0.45)]);
        assert_eq!(classify_trend(&s, 0.1), Trend::Improving);
    }

    #[test]
    fn test_trend_boundaries() {
        // 0.5 + 0.1 - 0.5 is not exactly 0.1 in binary, so build exact deltas
        let exact = series(&[("2025-01-01", 0.0), ("2025-02-01", 0.1)]);
        assert_eq!(classify_trend(&exact, 0.1), Trend::Stable);
        let exact_neg = series(&[("2025-01-01", 0.1), ("2025-02-01", 0.0)]);
        assert_eq!(classify_trend(&exact_neg, 0.1), Trend::Stable);

        assert_eq!(classify_trend(&two_points(0.10001), 0.1), Trend::Improving);
        assert_eq!(classify_trend(&two_points(-0.10001), 0.1), Trend::Declining);
    }

    #[test]
    fn test_short_series_is_stable() {
        assert_eq!(classify_trend(&[], 0.1), Trend::Stable);
        assert_eq!(
            classify_trend(&series(&[("2025-01-01", 0.9)]), 0.1),
            Trend::Stable
        );
    }

    #[test]
    fn test_trend_uses_first_and_last_only() {
        let s = series(&[
            ("2025-01-01", 0.3),
            ("2025-01-15", 0.9),
            ("2025-02-01", 0.35),
        ]);
        assert_eq!(classify_trend(&s, 0.1), Trend::Stable);
    }

    #[test]
    fn test_percent_change_guarded() {
        let zero = SeasonComparison::from_means(Some(0.5), Some(0.0));
        assert_eq!(zero.percent_change, 0.0);
        assert_eq!(zero.ndvi_difference, 0.5);
        assert_eq!(zero.performance, Performance::Better);

        let missing = SeasonComparison::from_means(Some(0.5), None);
        assert_eq!(missing.percent_change, 0.0);
        assert_eq!(missing.ndvi_difference, 0.5);
    }

    #[test]
    fn test_percent_change_and_performance() {
        let cmp = SeasonComparison::from_means(Some(0.4), Some(0.5));
        assert!((cmp.percent_change - -20.0).abs() < 1e-9);
        assert_eq!(cmp.performance, Performance::Worse);

        let same = SeasonComparison::from_means(Some(0.5), Some(0.5));
        assert_eq!(same.performance, Performance::Similar);
        assert_eq!(same.percent_change, 0.0);
    }

    #[test]
    fn test_historical_shift() {
        assert_eq!(historical_shift_days(1), 365);
        assert_eq!(historical_shift_days(3), 1095);
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Trend::Improving).unwrap(), "improving");
        assert_eq!(serde_json::to_value(Performance::Similar).unwrap(), "similar");
    }
}
