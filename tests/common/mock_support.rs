//! Test doubles shared by the integration tests.

use async_trait::async_trait;
use crop_advisor::api::AdvisorConfig;
use crop_advisor::error::{AdvisorError, Result};
use crop_advisor::requester::RecommendationRequester;
use crop_advisor::traits::{GenerationOptions, GenerationResult, GeneratorModel, TokenUsage};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// A well-formed single-object response.
pub const RICE_JSON: &str = r#"{
    "crop_name": "Rice",
    "planting_season": "Kharif season (June-July)",
    "care_instructions": [
        "Maintain 5 cm standing water after transplanting",
        "Apply nitrogen in three split doses",
        "Monitor for stem borer"
    ],
    "expected_yield": "20-25 quintals per acre",
    "market_value": "₹2183 per quintal MSP with strong demand"
}"#;

/// Generator that returns queued responses in order, then keeps failing.
pub struct MockGeneratorModel {
    responses: Mutex<VecDeque<Result<String>>>,
    call_count: AtomicU32,
}

impl MockGeneratorModel {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeneratorModel for MockGeneratorModel {
    async fn generate(
        &self,
        messages: &[String],
        _options: GenerationOptions,
    ) -> Result<GenerationResult> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        let text = next.unwrap_or_else(|| {
            Err(AdvisorError::ApiError("Mock generator failure".to_string()))
        })?;

        let prompt_tokens: usize = messages.iter().map(|m| m.split_whitespace().count()).sum();
        let completion_tokens = text.split_whitespace().count();
        Ok(GenerationResult {
            text,
            usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        })
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

/// Wire `model` into a requester with the default config.
pub fn requester_with(model: Arc<MockGeneratorModel>) -> RecommendationRequester {
    RecommendationRequester::with_generator(model, &AdvisorConfig::default())
        .expect("default config is valid")
}
