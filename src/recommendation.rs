//! The recommendation record, its fallback, the prompt that asks for it, and
//! the normalize → parse → validate pipeline applied to model output.

use crate::api::FarmConditions;
use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const FALLBACK_CROP_NAME: &str = "Wheat";
const FALLBACK_PLANTING_SEASON: &str = "Rabi season (November-December) for your region";
const FALLBACK_CARE_INSTRUCTIONS: [&str; 3] = [
    "Prepare field with proper ploughing and leveling",
    "Apply organic manure 15-20 tons per hectare",
    "Maintain proper irrigation schedule",
];
const FALLBACK_EXPECTED_YIELD: &str = "25-30 quintals per hectare";
const FALLBACK_MARKET_VALUE: &str = "₹2000-2500 per quintal with good market demand";

const DEFAULT_PRICE: &str = "Price varies";
const DEFAULT_DEMAND: &str = "Good demand";

/// A single crop suggestion.
///
/// Records only come from [`parse_recommendation`] (which enforces a non-empty
/// `crop_name` and `care_instructions`) or from [`CropRecommendation::fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropRecommendation {
    crop_name: String,
    planting_season: String,
    care_instructions: Vec<String>,
    expected_yield: String,
    market_value: String,
}

impl CropRecommendation {
    /// The static record returned once every attempt has failed.
    pub fn fallback() -> Self {
        Self {
            crop_name: FALLBACK_CROP_NAME.to_string(),
            planting_season: FALLBACK_PLANTING_SEASON.to_string(),
            care_instructions: FALLBACK_CARE_INSTRUCTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            expected_yield: FALLBACK_EXPECTED_YIELD.to_string(),
            market_value: FALLBACK_MARKET_VALUE.to_string(),
        }
    }

    pub fn crop_name(&self) -> &str {
        &self.crop_name
    }

    pub fn planting_season(&self) -> &str {
        &self.planting_season
    }

    pub fn care_instructions(&self) -> &[String] {
        &self.care_instructions
    }

    pub fn expected_yield(&self) -> &str {
        &self.expected_yield
    }

    pub fn market_value(&self) -> &str {
        &self.market_value
    }

    fn validate(self) -> Result<Self> {
        if self.crop_name.trim().is_empty() {
            return Err(AdvisorError::Validation("crop_name is empty".to_string()));
        }
        if self.care_instructions.is_empty() {
            return Err(AdvisorError::Validation(
                "care_instructions is empty".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Model output after structural parsing but before type coercion.
///
/// `crop_name` and `market_value` are left untyped because models regularly
/// return objects for them.
#[derive(Debug, Deserialize)]
struct RawRecommendation {
    crop_name: Value,
    planting_season: String,
    care_instructions: Vec<String>,
    expected_yield: String,
    market_value: Value,
}

impl RawRecommendation {
    fn coerce(self) -> Result<CropRecommendation> {
        let market_value = match self.market_value {
            Value::String(s) => s,
            Value::Object(map) => collapse_market_value(&map),
            Value::Null => {
                return Err(AdvisorError::Parse("market_value is null".to_string()));
            }
            other => other.to_string(),
        };

        Ok(CropRecommendation {
            crop_name: coerce_crop_name(self.crop_name),
            planting_season: self.planting_season,
            care_instructions: self.care_instructions,
            expected_yield: self.expected_yield,
            market_value,
        })
    }
}

/// `{"description": "Rice"}` becomes `"Rice"`; other objects are stringified.
fn coerce_crop_name(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Object(map) => {
            if let Some(description) = map.get("description") {
                return text_of(description);
            }
            Value::Object(map).to_string()
        }
        other => other.to_string(),
    }
}

/// Render a JSON value as plain text: strings unquoted, everything else as JSON.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten `{"current_price": .., "demand": ..}` into `"{price}, {demand}"`.
fn collapse_market_value(map: &Map<String, Value>) -> String {
    let price = map
        .get("current_price")
        .map_or_else(|| DEFAULT_PRICE.to_string(), text_of);
    let demand = map
        .get("demand")
        .map_or_else(|| DEFAULT_DEMAND.to_string(), text_of);
    format!("{}, {}", price, demand)
}

/// Extract the body of the first Markdown code fence, with or without a `json`
/// tag. Text that is already valid JSON is returned untouched, as is text with
/// no fence at all.
fn strip_code_fence(text: &str) -> &str {
    if serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok() {
        return text;
    }
    let Some(start) = text.find("```") else {
        return text;
    };
    let rest = &text[start + 3..];
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    body.trim_matches(|c: char| c.is_whitespace() || c == '`')
}

/// Escape raw control characters that appear inside JSON string literals.
///
/// Models often emit multi-line strings verbatim; strict JSON rejects them.
fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if (c as u32) < 0x20 {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    other => out.push_str(&format!("\\u{:04x}", other as u32)),
                }
                continue;
            }
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

/// Take the first element of an array-wrapped response and flatten its
/// `market_value`. Returns `None` when the text is not a non-empty array of
/// objects, in which case the caller keeps the original text.
fn unwrap_array(text: &str) -> Option<String> {
    let Value::Array(items) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    let Value::Object(mut first) = items.into_iter().next()? else {
        return None;
    };

    if let Some(Value::Object(market)) = first.get("market_value") {
        let flattened = collapse_market_value(market);
        first.insert("market_value".to_string(), Value::String(flattened));
    }

    serde_json::to_string(&first).ok()
}

/// Canonicalize raw model output into the text that is handed to the parser.
///
/// Trims whitespace, unwraps the first Markdown code fence, escapes raw control
/// characters inside strings, and repairs a response the model wrapped in an
/// array. A failed repair is ignored.
pub fn normalize_output(raw: &str) -> String {
    let text = escape_control_chars(strip_code_fence(raw.trim()));
    let text = text.as_str();

    if text.starts_with('[') {
        match unwrap_array(text) {
            Some(repaired) => {
                tracing::debug!("Unwrapped array-wrapped recommendation");
                return repaired;
            }
            None => tracing::debug!("Array repair failed; parsing original output"),
        }
    }

    text.to_string()
}

/// Parse model output into a validated [`CropRecommendation`].
///
/// Fails with [`AdvisorError::Parse`] when the normalized text does not match
/// the schema and with [`AdvisorError::Validation`] when `crop_name` or
/// `care_instructions` is empty.
pub fn parse_recommendation(raw: &str) -> Result<CropRecommendation> {
    let text = normalize_output(raw);
    let parsed: RawRecommendation = serde_json::from_str(&text)
        .map_err(|e| AdvisorError::Parse(format!("Invalid recommendation JSON: {}", e)))?;
    parsed.coerce()?.validate()
}

fn format_instructions() -> String {
    let schema = json!({
        "type": "object",
        "properties": {
            "crop_name": { "type": "string", "description": "Recommended crop name" },
            "planting_season": { "type": "string", "description": "Best planting season" },
            "care_instructions": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Care and maintenance tips"
            },
            "expected_yield": { "type": "string", "description": "Expected yield information" },
            "market_value": { "type": "string", "description": "Current market value/demand" }
        },
        "required": [
            "crop_name",
            "planting_season",
            "care_instructions",
            "expected_yield",
            "market_value"
        ]
    });
    format!(
        "The output must be a single JSON object conforming to this JSON schema:\n```\n{}\n```",
        schema
    )
}

/// Compose the instruction sent to the model for `conditions`.
pub fn build_prompt(conditions: &FarmConditions) -> String {
    format!(
        "As an agricultural expert specializing in Indian farming, provide ONE SINGLE crop recommendation for:\n\
         Location: {location}\n\
         Soil Type: {soil_type}\n\
         Season: {season}\n\
         Farm Size: {farm_size}\n\n\
         Consider Indian agricultural conditions, monsoon patterns, and local market demands.\n\
         Return ONLY ONE crop recommendation in this EXACT JSON format:\n\n\
         {{\n  \
           \"crop_name\": \"Name of the SINGLE most suitable crop\",\n  \
           \"planting_season\": \"Best time to plant this crop with specific months\",\n  \
           \"care_instructions\": [\"Detailed instruction 1\", \"Detailed instruction 2\", \"Detailed instruction 3\"],\n  \
           \"expected_yield\": \"Realistic yield per acre as a simple string\",\n  \
           \"market_value\": \"Current market price and demand as a simple string\"\n\
         }}\n\n\
         IMPORTANT: Return only ONE crop, not a list. Market value should be a simple string, not an object.\n\
         Focus on the MOST suitable crop for the given conditions.\n\
         {instructions}",
        location = conditions.location,
        soil_type = conditions.soil_type,
        season = conditions.season,
        farm_size = conditions.farm_size,
        instructions = format_instructions(),
    )
}
