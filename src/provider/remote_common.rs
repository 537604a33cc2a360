//! HTTP helpers shared by remote providers.

use crate::error::AdvisorError;

/// Map an HTTP response status to an `AdvisorError` for non-success codes.
/// Returns `Ok(response)` when the status is 2xx.
pub(crate) fn check_http_status(
    provider_name: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AdvisorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(match status.as_u16() {
        429 => AdvisorError::RateLimited,
        401 | 403 => AdvisorError::Unauthorized,
        500..=599 => AdvisorError::Unavailable,
        _ => AdvisorError::ApiError(format!("{} API error: {}", provider_name, status)),
    })
}

/// Classify a transport failure raised before any status was received.
pub(crate) fn transport_error(err: reqwest::Error) -> AdvisorError {
    if err.is_timeout() {
        AdvisorError::Timeout
    } else if err.is_connect() {
        AdvisorError::Unavailable
    } else {
        AdvisorError::ApiError(err.to_string())
    }
}

/// Join an API root and a relative endpoint path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
