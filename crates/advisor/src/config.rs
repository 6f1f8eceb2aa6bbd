//! Chat model configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Settings for the OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// API key; the advisor is disabled when absent.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    pub model: String,

    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 800,
            timeout_secs: 60,
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GROQ_API_KEY") {
            if !val.trim().is_empty() {
                config.api_key = Some(val.trim().to_string());
            }
        }

        if let Ok(val) = std::env::var("GROQ_MODEL") {
            if !val.trim().is_empty() {
                config.model = val.trim().to_string();
            }
        }

        if let Ok(val) = std::env::var("GROQ_BASE_URL") {
            if !val.is_empty() {
                config.base_url = val;
            }
        }

        if let Ok(val) = std::env::var("GROQ_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.timeout_secs = secs;
            }
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if self.base_url.is_empty() {
            return Err("base_url cannot be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdvisorConfig::default();
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 800);
        assert!(!config.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = AdvisorConfig {
            api_key: Some("secret".to_string()),
            ..AdvisorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let config = AdvisorConfig {
            temperature: 3.0,
            ..AdvisorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
