//! Secret lookup for API credentials.

use crate::api::{CredentialSelector, DEFAULT_API_KEY_ENV};
use crate::error::{AdvisorError, Result};
use std::collections::HashMap;

/// Read-only lookup of named secret values.
pub trait SecretSource: Send + Sync {
    /// Return the secret stored under `key`, or `None` if absent.
    fn secret(&self, key: &str) -> Option<String>;
}

/// Secrets from the process environment, seeded from a `.env` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl EnvSecrets {
    /// Load `.env` from the working directory (if present) into the process
    /// environment and return a source reading from it.
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to load .env file");
            }
        }
        Self
    }
}

impl SecretSource for EnvSecrets {
    fn secret(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl SecretSource for HashMap<String, String> {
    fn secret(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolve the API key for `selector`, falling back to [`DEFAULT_API_KEY_ENV`]
/// when no selector is given. Empty values count as missing.
pub fn resolve_api_key(
    secrets: &dyn SecretSource,
    selector: Option<CredentialSelector>,
) -> Result<String> {
    let key_name = selector.map_or(DEFAULT_API_KEY_ENV, |s| s.env_var());

    match secrets.secret(key_name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AdvisorError::Config(match selector {
            Some(sel) => format!("API key not found for {} ({} not set)", sel, key_name),
            None => format!("{} env var not set", key_name),
        })),
    }
}
