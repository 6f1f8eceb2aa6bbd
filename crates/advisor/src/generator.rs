//! Text generation capability.

use async_trait::async_trait;

use crate::error::Result;

/// A chat model that turns a system prompt and a user prompt into prose.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply. `Ok(None)` means the model returned no choice.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<Option<String>>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "text-generator"
    }
}
