//! The request → parse → validate attempt loop.

use crate::api::{AdvisorConfig, FarmConditions};
#[cfg(feature = "provider-groq")]
use crate::api::CredentialSelector;
use crate::error::Result;
use crate::recommendation::{CropRecommendation, build_prompt, parse_recommendation};
use crate::reliability::InstrumentedGeneratorModel;
#[cfg(feature = "provider-groq")]
use crate::secrets::{EnvSecrets, SecretSource, resolve_api_key};
use crate::traits::{GenerationOptions, GeneratorModel};
use std::sync::Arc;

/// Attempts made before falling back to [`CropRecommendation::fallback`].
pub const MAX_ATTEMPTS: u32 = 3;

/// `provider` metric label for the built-in Groq backend.
#[cfg(feature = "provider-groq")]
const GROQ_PROVIDER_ID: &str = "remote/groq";
/// `provider` metric label for generators passed to [`RecommendationRequester::with_generator`].
const CUSTOM_PROVIDER_ID: &str = "custom";

/// Asks a language model for one crop recommendation.
///
/// Holds no per-call state, so a single instance can serve any number of
/// sequential or concurrent requests.
pub struct RecommendationRequester {
    generator: Arc<dyn GeneratorModel>,
    options: GenerationOptions,
}

impl RecommendationRequester {
    /// Build a requester backed by Groq with the default configuration.
    ///
    /// Loads `.env`, then reads the key named by `selector` (or `GROQ_API_KEY`
    /// when `None`) from the environment.
    ///
    /// # Errors
    ///
    /// [`AdvisorError::Config`](crate::error::AdvisorError::Config) if the key
    /// is missing or empty.
    #[cfg(feature = "provider-groq")]
    pub fn new(selector: Option<CredentialSelector>) -> Result<Self> {
        Self::from_config(AdvisorConfig::default(), selector, &EnvSecrets::load())
    }

    /// Build a Groq-backed requester from an explicit config and secret source.
    #[cfg(feature = "provider-groq")]
    pub fn from_config(
        config: AdvisorConfig,
        selector: Option<CredentialSelector>,
        secrets: &dyn SecretSource,
    ) -> Result<Self> {
        config.validate()?;
        let api_key = resolve_api_key(secrets, selector)?;
        let generator = crate::provider::groq::GroqGeneratorModel::new(&config, api_key);
        tracing::debug!(
            model = %config.model_id,
            selector = ?selector,
            "Configured Groq recommendation requester"
        );
        Self::instrumented(Arc::new(generator), GROQ_PROVIDER_ID, &config)
    }

    /// Build a requester around any [`GeneratorModel`].
    ///
    /// `config` supplies the sampling options and the optional per-call
    /// timeout; its `model_id` and `base_url` are not used.
    pub fn with_generator(
        generator: Arc<dyn GeneratorModel>,
        config: &AdvisorConfig,
    ) -> Result<Self> {
        Self::instrumented(generator, CUSTOM_PROVIDER_ID, config)
    }

    fn instrumented(
        generator: Arc<dyn GeneratorModel>,
        provider_id: &str,
        config: &AdvisorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let generator: Arc<dyn GeneratorModel> = Arc::new(InstrumentedGeneratorModel {
            inner: generator,
            provider_id: provider_id.to_string(),
            timeout: config.timeout_duration(),
        });
        Ok(Self {
            generator,
            options: GenerationOptions {
                max_tokens: config.max_tokens,
                temperature: Some(config.temperature),
            },
        })
    }

    /// Request a single recommendation for the given conditions.
    ///
    /// Never fails: after [`MAX_ATTEMPTS`] failed attempts (generation error,
    /// unparseable output, or an empty `crop_name` / `care_instructions`) the
    /// fixed fallback record is returned.
    pub async fn request_recommendation(
        &self,
        location: &str,
        soil_type: &str,
        season: &str,
        farm_size: &str,
    ) -> CropRecommendation {
        let conditions = FarmConditions::new(location, soil_type, season, farm_size);
        let messages = [build_prompt(&conditions)];

        for attempt in 1..=MAX_ATTEMPTS {
            match self.attempt(&messages).await {
                Ok(recommendation) => {
                    metrics::counter!("crop_recommendation.attempts", "outcome" => "success")
                        .increment(1);
                    tracing::info!(
                        attempt,
                        crop = recommendation.crop_name(),
                        "Received crop recommendation"
                    );
                    return recommendation;
                }
                Err(e) => {
                    metrics::counter!(
                        "crop_recommendation.attempts",
                        "outcome" => e.outcome_label()
                    )
                    .increment(1);
                    tracing::warn!(
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        error = %e,
                        "Crop recommendation attempt failed"
                    );
                }
            }
        }

        metrics::counter!("crop_recommendation.fallback").increment(1);
        tracing::warn!(
            location = %conditions.location,
            season = %conditions.season,
            "All recommendation attempts failed; returning fallback"
        );
        CropRecommendation::fallback()
    }

    async fn attempt(&self, messages: &[String]) -> Result<CropRecommendation> {
        let output = self.generator.generate(messages, self.options.clone()).await?;
        if let Some(usage) = &output.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Recommendation generated"
            );
        }
        parse_recommendation(&output.text)
    }
}
