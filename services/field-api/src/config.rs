//! Service configuration assembled from the library configs.

use std::path::Path;

use advisor::AdvisorConfig;
use analytics::AnalyticsConfig;
use imagery::ProviderConfig;

/// Everything the service needs at startup.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub analytics: AnalyticsConfig,
    pub provider: ProviderConfig,
    pub advisor: AdvisorConfig,
}

impl ServiceConfig {
    /// Load analytics settings from the optional YAML file plus environment,
    /// and provider/advisor settings from the environment.
    pub fn load(analytics_file: Option<&Path>) -> anyhow::Result<Self> {
        let config = Self {
            analytics: AnalyticsConfig::load(analytics_file)?,
            provider: ProviderConfig::from_env(),
            advisor: AdvisorConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.analytics
            .validate()
            .map_err(|e| anyhow::anyhow!("analytics config: {e}"))?;
        self.provider
            .validate()
            .map_err(|e| anyhow::anyhow!("provider config: {e}"))?;
        self.advisor
            .validate()
            .map_err(|e| anyhow::anyhow!("advisor config: {e}"))?;
        Ok(())
    }
}
