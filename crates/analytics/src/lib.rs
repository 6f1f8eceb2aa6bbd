//! Vegetation analytics engine.
//!
//! Composes [`imagery::ImageProvider`] operations into zone classification,
//! water-stress and disease-risk detection, NDVI time series and season
//! comparison, and serves map tiles through a credential cache.
//!
//! ```text
//! FieldAnalyzer
//!   ├─ yield_prediction ──► zones::classify_productivity_zones
//!   ├─ water_stress ──────► water::detect_water_stress
//!   ├─ crop_growth ───────► temporal::get_time_series_ndvi + classify_trend
//!   ├─ disease_alert ─────► disease::detect_disease_risk
//!   ├─ historical_comparison ► temporal::compare_historical_seasons
//!   └─ full_analysis ─────► all of the above + summary::summarize
//!
//! MapTileService ──► storage::MapCredentialCache ──(miss)──► issue_map_credential
//! ```
//!
//! Zone, water and disease steps degrade to zero/low-risk results with a
//! `warning` when the provider fails. Everything else propagates the error.

pub mod config;
pub mod disease;
pub mod error;
pub mod orchestrator;
pub mod stats;
pub mod summary;
pub mod temporal;
pub mod tiles;
pub mod water;
pub mod zones;

pub use config::{AnalyticsConfig, TileConfig};
pub use disease::{detect_disease_risk, DiseaseRiskReport, RiskLevel};
pub use error::{AnalyticsError, Result};
pub use orchestrator::{AnalysisKind, FieldAnalyzer, FullAnalysis, MAX_YEARS_BACK};
pub use stats::{safe_percent, safe_ratio, AreaShare};
pub use summary::{summarize, CropGrowthReport, FieldSnapshot, FieldSummary, YieldPrediction};
pub use temporal::{
    classify_trend, compare_historical_seasons, get_time_series_ndvi, HistoricalComparison,
    Performance, SeasonComparison, SeasonStatistics, TimeSeriesPoint, Trend,
};
pub use tiles::{MapTileService, TileRequest, TileResponse, DEFAULT_FIELD_ID};
pub use water::{detect_water_stress, WaterStressReport};
pub use zones::{classify_productivity_zones, ProductivityZones, ZoneThresholds};
