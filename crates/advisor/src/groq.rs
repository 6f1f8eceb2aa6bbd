//! OpenAI-compatible chat completion client (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::generator::TextGenerator;

/// Chat completion client for `{base_url}/chat/completions`.
pub struct ChatCompletionClient {
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    /// Build a client from configuration. Fails when no API key is set.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AdvisorError::config("GROQ_API_KEY is not set"))?;
        config.validate().map_err(AdvisorError::config)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatError {
    error: ChatErrorDetail,
}

#[derive(Deserialize)]
struct ChatErrorDetail {
    message: String,
}

/// First choice's text, if any.
fn first_choice_text(body: &str) -> Result<Option<String>> {
    let response: ChatResponse = serde_json::from_str(body)?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content))
}

/// Provider error message from a non-success body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ChatError>(body)
        .map(|err| err.error.message)
        .unwrap_or_else(|_| format!("HTTP {status}: {body}"))
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<Option<String>> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "Requesting chat completion");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(AdvisorError::provider(error_message(status, &body)));
        }

        first_choice_text(&body)
    }

    fn name(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let err = ChatCompletionClient::from_config(&AdvisorConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, AdvisorError::Config { .. }));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = AdvisorConfig {
            api_key: Some("k".to_string()),
            base_url: "http://localhost:9000/v1/".to_string(),
            ..AdvisorConfig::default()
        };
        let client = ChatCompletionClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/chat/completions");
        assert_eq!(client.model(), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.7,
            max_tokens: 800,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 800);
    }

    #[test]
    fn test_first_choice_text() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Irrigate."}}]}"#;
        assert_eq!(first_choice_text(body).unwrap().as_deref(), Some("Irrigate."));
        assert_eq!(first_choice_text(r#"{"choices":[]}"#).unwrap(), None);
        assert!(first_choice_text("not json").is_err());
    }

    #[test]
    fn test_error_message_parsing() {
        let status = reqwest::StatusCode::UNAUTHORIZED;
        assert_eq!(
            error_message(status, r#"{"error":{"message":"Invalid API Key"}}"#),
            "Invalid API Key"
        );
        assert_eq!(
            error_message(status, "oops"),
            "HTTP 401 Unauthorized: oops"
        );
    }
}
