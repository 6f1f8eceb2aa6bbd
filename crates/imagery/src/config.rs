//! Configuration for the remote image provider.

use serde::{Deserialize, Serialize};

/// Connection and filtering settings for the geospatial backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the compute backend API.
    pub endpoint: String,

    /// API key sent as a bearer token, if the backend requires one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Cloud project the backend bills against.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Image collection the composites are built from.
    pub collection: String,

    /// Captures with cloud cover at or above this percentage are dropped.
    pub max_cloud_percent: f64,

    /// HTTP timeout for a single backend call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8090".to_string(),
            api_key: None,
            project_id: None,
            collection: "COPERNICUS/S2_SR_HARMONIZED".to_string(),
            max_cloud_percent: 20.0,
            timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("IMAGERY_ENDPOINT") {
            config.endpoint = val;
        }

        if let Ok(val) = std::env::var("IMAGERY_API_KEY") {
            if !val.is_empty() {
                config.api_key = Some(val);
            }
        }

        if let Ok(val) = std::env::var("GEE_PROJECT_ID") {
            if !val.is_empty() {
                config.project_id = Some(val);
            }
        }

        if let Ok(val) = std::env::var("IMAGERY_COLLECTION") {
            config.collection = val;
        }

        if let Ok(val) = std::env::var("IMAGERY_MAX_CLOUD_PERCENT") {
            if let Ok(pct) = val.parse() {
                config.max_cloud_percent = pct;
            }
        }

        if let Ok(val) = std::env::var("IMAGERY_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.timeout_secs = secs;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("endpoint must not be empty".to_string());
        }

        if !(0.0..=100.0).contains(&self.max_cloud_percent) {
            return Err("max_cloud_percent must be 0-100".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }

        Ok(())
    }
}
