//! Application state for the field API.

use std::sync::Arc;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use advisor::FieldAdvisor;
use analytics::{AnalyticsConfig, FieldAnalyzer, MapTileService};
use imagery::{ImageProvider, RemoteImageProvider};
use storage::MemoryMapCache;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Runs the field analyses.
    pub analyzer: FieldAnalyzer,

    /// Serves map tile URLs through the credential cache.
    pub tiles: MapTileService,

    /// Text recommendations; unconfigured without an API key.
    pub advisor: FieldAdvisor,

    /// Concrete cache handle, kept for statistics.
    pub map_cache: Arc<MemoryMapCache>,

    /// Name of the image provider backend.
    pub provider_name: String,

    /// Prometheus render handle, absent when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state against the remote imagery backend.
    pub fn new(config: &ServiceConfig, metrics: Option<PrometheusHandle>) -> Result<Self> {
        let provider: Arc<dyn ImageProvider> =
            Arc::new(RemoteImageProvider::new(config.provider.clone())?);
        let advisor = FieldAdvisor::from_config(&config.advisor)?;

        info!(
            endpoint = %config.provider.endpoint,
            ai_assistant = advisor.is_configured(),
            "Application state initialized"
        );

        let mut state = Self::with_provider(provider, config.analytics.clone(), advisor);
        state.metrics = metrics;
        Ok(state)
    }

    /// Build state around any provider and advisor.
    pub fn with_provider(
        provider: Arc<dyn ImageProvider>,
        analytics: AnalyticsConfig,
        advisor: FieldAdvisor,
    ) -> Self {
        let map_cache = Arc::new(MemoryMapCache::with_ttl(analytics.tiles.cache_ttl()));
        let provider_name = provider.name().to_string();
        let tiles = MapTileService::new(provider.clone(), map_cache.clone(), analytics.clone());
        let analyzer = FieldAnalyzer::new(provider, analytics);

        Self {
            analyzer,
            tiles,
            advisor,
            map_cache,
            provider_name,
            metrics: None,
        }
    }
}
