//! Thresholds, default windows and tile settings for the analytics engine.
//!
//! Values resolve in three layers: built-in defaults, an optional YAML file,
//! then environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AnalyticsError, Result};
use crate::orchestrator::MAX_YEARS_BACK;

/// Classification thresholds and default analysis windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// NDVI at or above this is high productivity.
    pub ndvi_high_threshold: f64,

    /// NDVI at or above this (and below high) is medium productivity.
    pub ndvi_medium_threshold: f64,

    /// NDMI below this counts as water-stressed.
    pub water_stress_threshold: f64,

    /// NDVI drop that marks a pixel as anomalous.
    pub disease_sensitivity: f64,

    /// Irrigation is required when the stressed area exceeds this percentage.
    pub irrigation_area_percent: f64,

    /// Anomalous area above this percentage is medium risk.
    pub disease_medium_area_percent: f64,

    /// Anomalous area above this percentage is high risk.
    pub disease_high_area_percent: f64,

    /// Days the disease comparison window is shifted back.
    pub disease_shift_days: i64,

    /// NDVI change beyond which a growth trend is not stable.
    pub trend_delta: f64,

    /// Low-productivity share that raises a summary alert.
    pub low_productivity_alert_percent: f64,

    /// Default lookback for yield, water stress and historical comparison.
    pub analysis_lookback_days: i64,

    /// Default lookback for crop growth.
    pub growth_lookback_days: i64,

    /// Default lookback for the disease alert.
    pub disease_lookback_days: i64,

    /// Default lookback for the anomaly map.
    pub anomaly_lookback_days: i64,

    pub default_years_back: u32,

    pub default_interval_days: u32,

    pub tiles: TileConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            ndvi_high_threshold: 0.6,
            ndvi_medium_threshold: 0.4,
            water_stress_threshold: 0.3,
            disease_sensitivity: 0.15,
            irrigation_area_percent: 30.0,
            disease_medium_area_percent: 5.0,
            disease_high_area_percent: 15.0,
            disease_shift_days: 30,
            trend_delta: 0.1,
            low_productivity_alert_percent: 40.0,
            analysis_lookback_days: 30,
            growth_lookback_days: 90,
            disease_lookback_days: 15,
            anomaly_lookback_days: 15,
            default_years_back: 1,
            default_interval_days: 10,
            tiles: TileConfig::default(),
        }
    }
}

/// Map tile rendering and caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Base URL tile templates are built on.
    pub base_url: String,

    /// How long an issued credential is reused.
    pub cache_ttl_secs: u64,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            base_url: "https://earthengine.googleapis.com/v1".to_string(),
            cache_ttl_secs: 3600,
        }
    }
}

impl TileConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl AnalyticsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Defaults, then the YAML file if given, then environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate().map_err(AnalyticsError::Config)?;
        Ok(config)
    }

    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AnalyticsError::config(format!("invalid analytics config: {}", e)))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalyticsError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), "Loaded analytics config");
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("NDVI_HIGH_THRESHOLD") {
            self.ndvi_high_threshold = v;
        }
        if let Some(v) = env_parse("NDVI_MEDIUM_THRESHOLD") {
            self.ndvi_medium_threshold = v;
        }
        if let Some(v) = env_parse("WATER_STRESS_THRESHOLD") {
            self.water_stress_threshold = v;
        }
        if let Some(v) = env_parse("DISEASE_DETECTION_SENSITIVITY") {
            self.disease_sensitivity = v;
        }
        if let Ok(v) = std::env::var("TILE_BASE_URL") {
            if !v.is_empty() {
                self.tiles.base_url = v;
            }
        }
        if let Some(v) = env_parse("MAP_CACHE_TTL_SECS") {
            self.tiles.cache_ttl_secs = v;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let in_index_range = |v: f64| (-1.0..=1.0).contains(&v);

        if !in_index_range(self.ndvi_high_threshold) || !in_index_range(self.ndvi_medium_threshold)
        {
            return Err("NDVI thresholds must be within [-1, 1]".to_string());
        }
        if self.ndvi_medium_threshold >= self.ndvi_high_threshold {
            return Err("ndvi_medium_threshold must be below ndvi_high_threshold".to_string());
        }
        if !in_index_range(self.water_stress_threshold) {
            return Err("water_stress_threshold must be within [-1, 1]".to_string());
        }
        if !(self.disease_sensitivity > 0.0 && self.disease_sensitivity <= 2.0) {
            return Err("disease_sensitivity must be in (0, 2]".to_string());
        }
        if self.disease_medium_area_percent > self.disease_high_area_percent {
            return Err(
                "disease_medium_area_percent must not exceed disease_high_area_percent"
                    .to_string(),
            );
        }
        if self.trend_delta < 0.0 {
            return Err("trend_delta must not be negative".to_string());
        }
        for (name, days) in [
            ("analysis_lookback_days", self.analysis_lookback_days),
            ("growth_lookback_days", self.growth_lookback_days),
            ("disease_lookback_days", self.disease_lookback_days),
            ("anomaly_lookback_days", self.anomaly_lookback_days),
            ("disease_shift_days", self.disease_shift_days),
        ] {
            if days <= 0 {
                return Err(format!("{} must be positive", name));
            }
        }
        if self.default_years_back == 0 || self.default_interval_days == 0 {
            return Err("default_years_back and default_interval_days must be positive".to_string());
        }
        if self.default_years_back > MAX_YEARS_BACK {
            return Err(format!("default_years_back cannot exceed {MAX_YEARS_BACK}"));
        }
        if self.tiles.base_url.is_empty() {
            return Err("tiles.base_url cannot be empty".to_string());
        }
        Ok(())
    }
}
