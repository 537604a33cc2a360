//! Public configuration types: credential selectors, requester settings, and
//! the farming conditions a recommendation is requested for.

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Environment variable read when no [`CredentialSelector`] is given.
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Model used when [`AdvisorConfig::model_id`] is not overridden.
pub const DEFAULT_MODEL_ID: &str = "llama-3.1-8b-instant";

/// Sampling temperature used when [`AdvisorConfig::temperature`] is not overridden.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Names one of the configured Groq API keys.
///
/// Hosts that rotate between several keys pick one per requester; each
/// selector maps to its own environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialSelector {
    #[serde(rename = "GROQ1")]
    Groq1,
    #[serde(rename = "GROQ2")]
    Groq2,
    #[serde(rename = "GROQ3")]
    Groq3,
    #[serde(rename = "GROQ4")]
    Groq4,
}

impl CredentialSelector {
    pub const ALL: [CredentialSelector; 4] = [Self::Groq1, Self::Groq2, Self::Groq3, Self::Groq4];

    /// The environment variable holding this selector's secret.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Groq1 => "GROQ_API_KEY_1",
            Self::Groq2 => "GROQ_API_KEY_2",
            Self::Groq3 => "GROQ_API_KEY_3",
            Self::Groq4 => "GROQ_API_KEY_4",
        }
    }
}

impl std::fmt::Display for CredentialSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Groq1 => write!(f, "GROQ1"),
            Self::Groq2 => write!(f, "GROQ2"),
            Self::Groq3 => write!(f, "GROQ3"),
            Self::Groq4 => write!(f, "GROQ4"),
        }
    }
}

impl FromStr for CredentialSelector {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sel| sel.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AdvisorError::Config(format!(
                    "Unknown credential selector '{}' (expected GROQ1..GROQ4)",
                    s
                ))
            })
    }
}

/// Settings for the generation client behind a
/// [`RecommendationRequester`](crate::requester::RecommendationRequester).
///
/// Every field has a default, so `{}` is a valid configuration.
///
/// # Example JSON
///
/// ```json
/// {
///   "model_id": "llama-3.1-8b-instant",
///   "temperature": 0.7,
///   "timeout": 30
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvisorConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens. Provider default if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    /// Per-call timeout in seconds. `None` leaves timing to the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout: None,
            base_url: default_base_url(),
        }
    }
}

impl AdvisorConfig {
    /// Validate invariants: non-empty model and base URL, temperature within
    /// `0.0..=2.0`, and non-zero limits when set.
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(AdvisorError::Config("Model id cannot be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(AdvisorError::Config("Base URL cannot be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AdvisorError::Config(format!(
                "Temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.max_tokens == Some(0) {
            return Err(AdvisorError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.timeout == Some(0) {
            return Err(AdvisorError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| AdvisorError::Config(format!("Invalid advisor config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AdvisorError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    pub(crate) fn timeout_duration(&self) -> Option<std::time::Duration> {
        self.timeout.map(std::time::Duration::from_secs)
    }
}

/// The farming conditions a recommendation is requested for.
///
/// All fields are free text and are embedded into the prompt verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConditions {
    pub location: String,
    pub soil_type: String,
    pub season: String,
    pub farm_size: String,
}

impl FarmConditions {
    pub fn new(
        location: impl Into<String>,
        soil_type: impl Into<String>,
        season: impl Into<String>,
        farm_size: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            soil_type: soil_type.into(),
            season: season.into(),
            farm_size: farm_size.into(),
        }
    }
}
