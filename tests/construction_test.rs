//! Requester construction: credential resolution and config validation.
#![cfg(feature = "provider-groq")]

use crop_advisor::api::{AdvisorConfig, CredentialSelector};
use crop_advisor::error::AdvisorError;
use crop_advisor::requester::RecommendationRequester;
use std::collections::HashMap;

fn secrets(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_missing_selected_key_is_configuration_error() {
    // The base URL is unroutable: construction must fail before any request.
    let config = AdvisorConfig {
        base_url: "http://192.0.2.1:9".to_string(),
        ..AdvisorConfig::default()
    };
    let result = RecommendationRequester::from_config(
        config,
        Some(CredentialSelector::Groq2),
        &secrets(&[("GROQ_API_KEY_1", "gsk_one")]),
    );

    match result {
        Err(AdvisorError::Config(msg)) => assert!(msg.contains("GROQ2")),
        Err(e) => panic!("Expected Config error, got: {}", e),
        Ok(_) => panic!("Expected Config error, got a requester"),
    }
}

#[test]
fn test_every_selector_resolves_its_own_key() {
    let source = secrets(&[
        ("GROQ_API_KEY_1", "gsk_1"),
        ("GROQ_API_KEY_2", "gsk_2"),
        ("GROQ_API_KEY_3", "gsk_3"),
        ("GROQ_API_KEY_4", "gsk_4"),
    ]);
    for selector in CredentialSelector::ALL {
        let result =
            RecommendationRequester::from_config(AdvisorConfig::default(), Some(selector), &source);
        assert!(result.is_ok(), "selector {} should resolve", selector);
    }
}

#[test]
fn test_no_selector_uses_default_key() {
    let ok = RecommendationRequester::from_config(
        AdvisorConfig::default(),
        None,
        &secrets(&[("GROQ_API_KEY", "gsk_default")]),
    );
    assert!(ok.is_ok());

    let missing = RecommendationRequester::from_config(
        AdvisorConfig::default(),
        None,
        &secrets(&[("GROQ_API_KEY_1", "gsk_one")]),
    );
    assert!(matches!(missing, Err(AdvisorError::Config(_))));
}

#[test]
fn test_empty_secret_is_configuration_error() {
    let result = RecommendationRequester::from_config(
        AdvisorConfig::default(),
        Some(CredentialSelector::Groq4),
        &secrets(&[("GROQ_API_KEY_4", "   ")]),
    );
    assert!(matches!(result, Err(AdvisorError::Config(_))));
}

#[test]
fn test_invalid_config_rejected_before_key_lookup() {
    let config = AdvisorConfig {
        model_id: String::new(),
        ..AdvisorConfig::default()
    };
    let result = RecommendationRequester::from_config(
        config,
        Some(CredentialSelector::Groq1),
        &secrets(&[("GROQ_API_KEY_1", "gsk_one")]),
    );
    match result {
        Err(AdvisorError::Config(msg)) => assert!(msg.contains("Model id")),
        _ => panic!("Expected Config error for empty model id"),
    }
}

#[test]
fn test_selector_parsed_from_string() -> anyhow::Result<()> {
    let selector: CredentialSelector = "GROQ3".parse()?;
    RecommendationRequester::from_config(
        AdvisorConfig::default(),
        Some(selector),
        &secrets(&[("GROQ_API_KEY_3", "gsk_3")]),
    )?;
    Ok(())
}
