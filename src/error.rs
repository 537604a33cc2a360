//! Error types for the crop advisor.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Every failure the crate can produce.
///
/// Only [`Config`](Self::Config) ever reaches callers of
/// [`RecommendationRequester`](crate::requester::RecommendationRequester); the
/// rest are absorbed by the attempt loop and surface only in logs and metrics.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Missing credential or invalid configuration. Raised at construction.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An HTTP or transport-level error from the generation endpoint.
    #[error("API error: {0}")]
    ApiError(String),

    /// The endpoint returned HTTP 429.
    #[error("Rate limited")]
    RateLimited,

    /// The endpoint returned HTTP 401/403.
    #[error("Unauthorized")]
    Unauthorized,

    /// The generation call exceeded its configured timeout.
    #[error("Timeout")]
    Timeout,

    /// The endpoint is unavailable (HTTP 5xx, circuit breaker open).
    #[error("Unavailable")]
    Unavailable,

    /// Model output could not be read as a recommendation record.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Model output parsed but violates the record's invariants.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AdvisorError {
    /// Returns `true` when the text-generation call itself failed, as opposed
    /// to its output being unusable.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::ApiError(_)
                | Self::RateLimited
                | Self::Unauthorized
                | Self::Timeout
                | Self::Unavailable
        )
    }

    /// Short label used for the `outcome` metric dimension.
    pub(crate) fn outcome_label(&self) -> &'static str {
        match self {
            e if e.is_generation_failure() => "generation_failure",
            Self::Parse(_) => "parse_failure",
            Self::Validation(_) => "validation_failure",
            _ => "config_error",
        }
    }
}
