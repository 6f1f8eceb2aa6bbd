//! FieldAdvisor behavior with scripted generators.

use std::sync::{Arc, Mutex};

use advisor::{
    AdvisorConfig, AdvisorError, FieldAdvisor, TextGenerator, NOT_CONFIGURED, NO_RESPONSE,
    SYSTEM_PROMPT,
};
use analytics::{FieldSnapshot, WaterStressReport};
use async_trait::async_trait;

enum Reply {
    Text(&'static str),
    Empty,
    Fail,
}

struct ScriptedGenerator {
    reply: Reply,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> advisor::Result<Option<String>> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        match self.reply {
            Reply::Text(text) => Ok(Some(text.to_string())),
            Reply::Empty => Ok(None),
            Reply::Fail => Err(AdvisorError::provider("rate limited")),
        }
    }
}

fn stressed_field() -> FieldSnapshot {
    FieldSnapshot {
        water_stress: Some(WaterStressReport {
            average_moisture_index: Some(0.05),
            water_stress_area_percent: 45.0,
            requires_irrigation: true,
            ..WaterStressReport::default()
        }),
        ..FieldSnapshot::default()
    }
}

#[tokio::test]
async fn test_unconfigured_advisor() {
    let advisor = FieldAdvisor::unconfigured();
    assert!(!advisor.is_configured());
    assert_eq!(advisor.recommend(&stressed_field(), None).await, NOT_CONFIGURED);
}

#[tokio::test]
async fn test_from_config_without_key_is_unconfigured() {
    let advisor = FieldAdvisor::from_config(&AdvisorConfig::default()).unwrap();
    assert!(!advisor.is_configured());
}

#[tokio::test]
async fn test_reply_passed_through_with_prompts() {
    let generator = ScriptedGenerator::new(Reply::Text("Irrigate the north block."));
    let advisor = FieldAdvisor::new(generator.clone());

    let text = advisor
        .recommend(&stressed_field(), Some("Should I irrigate?"))
        .await;
    assert_eq!(text, "Irrigate the north block.");

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let (system, user) = &prompts[0];
    assert_eq!(system, SYSTEM_PROMPT);
    assert!(user.contains("- Water stress area: 45.0%"));
    assert!(user.contains("- Irrigation needed: Yes"));
    assert!(user.ends_with("User Question: Should I irrigate?"));
}

#[tokio::test]
async fn test_empty_reply() {
    let advisor = FieldAdvisor::new(ScriptedGenerator::new(Reply::Empty));
    assert_eq!(advisor.recommend(&stressed_field(), None).await, NO_RESPONSE);
}

#[tokio::test]
async fn test_generator_failure_becomes_message() {
    let advisor = FieldAdvisor::new(ScriptedGenerator::new(Reply::Fail));
    let text = advisor.recommend(&stressed_field(), None).await;
    assert_eq!(
        text,
        "Error generating recommendation: Provider error: rate limited"
    );
}
