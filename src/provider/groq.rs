use crate::api::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::provider::remote_common::{check_http_status, endpoint, transport_error};
use crate::reliability::CircuitBreaker;
use crate::traits::{GenerationOptions, GenerationResult, GeneratorModel, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Text generation through [Groq's](https://console.groq.com/docs/api-reference)
/// OpenAI-compatible `/chat/completions` endpoint.
///
/// Every call goes through a [`CircuitBreaker`], so a dead endpoint is
/// rejected locally after a few consecutive failures.
pub struct GroqGeneratorModel {
    client: Client,
    cb: CircuitBreaker,
    url: String,
    model_id: String,
    api_key: String,
}

impl std::fmt::Debug for GroqGeneratorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqGeneratorModel")
            .field("url", &self.url)
            .field("model_id", &self.model_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GroqGeneratorModel {
    /// Build a client for `config.model_id` at `config.base_url`. No request is
    /// made until [`generate`](GeneratorModel::generate) is called.
    pub fn new(config: &AdvisorConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            cb: CircuitBreaker::default(),
            url: endpoint(&config.base_url, "chat/completions"),
            model_id: config.model_id.clone(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl GeneratorModel for GroqGeneratorModel {
    async fn generate(
        &self,
        messages: &[String],
        options: GenerationOptions,
    ) -> Result<GenerationResult> {
        let messages: Vec<serde_json::Value> = messages
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let role = if i % 2 == 0 { "user" } else { "assistant" };
                json!({ "role": role, "content": content })
            })
            .collect();

        self.cb
            .call(move || async move {
                let mut body = json!({
                    "model": self.model_id,
                    "messages": messages,
                });
                if let Some(max_tokens) = options.max_tokens {
                    body["max_tokens"] = json!(max_tokens);
                }
                if let Some(temperature) = options.temperature {
                    body["temperature"] = json!(temperature);
                }

                let response = self
                    .client
                    .post(&self.url)
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(transport_error)?;

                let body: serde_json::Value = check_http_status("Groq", response)?
                    .json()
                    .await
                    .map_err(|e| AdvisorError::ApiError(e.to_string()))?;

                let text = body["choices"][0]["message"]["content"]
                    .as_str()
                    .ok_or_else(|| {
                        AdvisorError::ApiError(
                            "Groq response has no choices[0].message.content".to_string(),
                        )
                    })?
                    .to_string();

                let usage = body.get("usage").map(|u| TokenUsage {
                    prompt_tokens: u["prompt_tokens"].as_u64().unwrap_or(0) as usize,
                    completion_tokens: u["completion_tokens"].as_u64().unwrap_or(0) as usize,
                    total_tokens: u["total_tokens"].as_u64().unwrap_or(0) as usize,
                });

                Ok(GenerationResult { text, usage })
            })
            .await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
