//! Crop recommendations from a hosted language model.
//!
//! A [`RecommendationRequester`](requester::RecommendationRequester) turns four
//! free-text farming conditions into a prompt, asks a
//! [`GeneratorModel`](traits::GeneratorModel) for a single JSON recommendation,
//! repairs the common ways models deviate from the requested shape, and retries
//! up to [`MAX_ATTEMPTS`](requester::MAX_ATTEMPTS) times before returning a fixed
//! fallback record. The caller always gets a usable
//! [`CropRecommendation`](recommendation::CropRecommendation).
//!
//! # Key concepts
//!
//! - **Credential selector** — [`CredentialSelector`](api::CredentialSelector)
//!   picks one of several configured Groq keys (`GROQ_API_KEY_1` …).
//! - **Generator seam** — any [`GeneratorModel`](traits::GeneratorModel) can back
//!   the requester; [`GroqGeneratorModel`](provider::groq::GroqGeneratorModel) is
//!   the built-in one (feature `provider-groq`).
//! - **Normalization** — [`parse_recommendation`](recommendation::parse_recommendation)
//!   unwraps code fences and array-wrapped objects and coerces object-valued
//!   `crop_name` / `market_value` fields before validating.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # #[cfg(feature = "provider-groq")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use crop_advisor::api::CredentialSelector;
//! use crop_advisor::requester::RecommendationRequester;
//!
//! let requester = RecommendationRequester::new(Some(CredentialSelector::Groq1))?;
//! let rec = requester
//!     .request_recommendation("Punjab", "Alluvial", "Rabi", "5 acres")
//!     .await;
//! println!("{}: {}", rec.crop_name(), rec.market_value());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod provider;
pub mod recommendation;
pub mod reliability;
pub mod requester;
pub mod secrets;
pub mod traits;

#[cfg(test)]
mod mock;
