//! Recommendation service.

use std::sync::Arc;

use analytics::FieldSnapshot;
use metrics::counter;
use tracing::{debug, error, info, instrument};

use crate::config::AdvisorConfig;
use crate::error::Result;
use crate::generator::TextGenerator;
use crate::groq::ChatCompletionClient;
use crate::prompt::{field_summary, user_prompt, SYSTEM_PROMPT};

pub const NOT_CONFIGURED: &str = "AI Assistant is not configured. Please provide GROQ_API_KEY.";
pub const NO_RESPONSE: &str = "No response generated from the AI model.";

/// Turns a field snapshot and an optional question into advice.
///
/// [`FieldAdvisor::recommend`] always returns text: a missing generator,
/// an empty reply and a failed call each map to a fixed message.
#[derive(Clone, Default)]
pub struct FieldAdvisor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl FieldAdvisor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// An advisor with no model behind it.
    pub fn unconfigured() -> Self {
        Self { generator: None }
    }

    /// Chat client when an API key is configured, otherwise unconfigured.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        if !config.is_configured() {
            info!("No GROQ_API_KEY set; AI assistant disabled");
            return Ok(Self::unconfigured());
        }
        let client = ChatCompletionClient::from_config(config)?;
        info!(model = %client.model(), "AI assistant enabled");
        Ok(Self::new(Arc::new(client)))
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    #[instrument(skip(self, snapshot, query), fields(has_query = query.is_some()))]
    pub async fn recommend(&self, snapshot: &FieldSnapshot, query: Option<&str>) -> String {
        let Some(generator) = &self.generator else {
            return NOT_CONFIGURED.to_string();
        };

        let summary = field_summary(snapshot);
        let prompt = user_prompt(&summary, query);

        debug!(generator = generator.name(), "Requesting recommendation");
        match generator.generate(SYSTEM_PROMPT, &prompt).await {
            Ok(Some(text)) => {
                counter!("advisor_requests_total", "outcome" => "ok").increment(1);
                text
            }
            Ok(None) => {
                counter!("advisor_requests_total", "outcome" => "empty").increment(1);
                NO_RESPONSE.to_string()
            }
            Err(e) => {
                counter!("advisor_requests_total", "outcome" => "error").increment(1);
                error!(error = %e, "Recommendation request failed");
                format!("Error generating recommendation: {e}")
            }
        }
    }
}

impl std::fmt::Debug for FieldAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAdvisor")
            .field("configured", &self.is_configured())
            .finish()
    }
}
