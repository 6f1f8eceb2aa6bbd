//! Agronomic advice from field analytics.
//!
//! Summarizes a [`analytics::FieldSnapshot`] into prose and asks an
//! OpenAI-compatible chat model for recommendations.

pub mod config;
pub mod error;
pub mod generator;
pub mod groq;
pub mod prompt;
pub mod service;

pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use generator::TextGenerator;
pub use groq::ChatCompletionClient;
pub use prompt::{field_summary, user_prompt, SYSTEM_PROMPT};
pub use service::{FieldAdvisor, NOT_CONFIGURED, NO_RESPONSE};
