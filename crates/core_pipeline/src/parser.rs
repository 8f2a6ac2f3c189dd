//! Response parser for model output
//!
//! Text models often wrap JSON in markdown code fences or trail it with
//! prose. This module strips that noise, decodes the remainder as JSON and
//! validates it against the expected record shape:
//! - Fence stripping (```` ```json ... ``` ````)
//! - JSON decoding (malformed syntax is reported separately)
//! - Shape mapping and field validation

use crate::types::{FoodIdentification, Recipe, RecipeSet};
use serde::de::DeserializeOwned;
use serde_json::Value;

const FENCE: &str = "```";

/// Why a model reply could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// The content is not valid JSON
    #[error("malformed syntax: {0}")]
    MalformedSyntax(String),
    /// Valid JSON that does not match the expected shape
    #[error("validation failed: {0}")]
    Validation(String),
}

/// A model reply that failed decoding or validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("could not parse model response: {reason}")]
pub struct ParseError {
    /// The untouched model output
    pub raw: String,
    pub reason: ParseFailure,
}

impl ParseError {
    fn syntax(raw: &str, msg: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: ParseFailure::MalformedSyntax(msg.into()),
        }
    }

    fn validation(raw: &str, msg: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: ParseFailure::Validation(msg.into()),
        }
    }

    /// True if the payload was not JSON at all
    pub fn is_syntax_error(&self) -> bool {
        matches!(self.reason, ParseFailure::MalformedSyntax(_))
    }
}

/// A record shape the parser can produce
///
/// `validate` runs after serde mapping and checks constraints the type
/// system cannot express (non-empty names, bounded confidence).
pub trait ModelShape: DeserializeOwned {
    /// Human-readable name used in error messages
    const SHAPE: &'static str;

    /// Pre-mapping check on the decoded JSON value
    fn check_value(_value: &Value) -> Result<(), String> {
        Ok(())
    }

    fn validate(&self) -> Result<(), String>;
}

impl ModelShape for FoodIdentification {
    const SHAPE: &'static str = "food identification";

    fn check_value(value: &Value) -> Result<(), String> {
        if value.is_object() {
            Ok(())
        } else {
            Err(format!("expected a JSON object, got {}", json_kind(value)))
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("food name is empty".to_string());
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence {} is outside the range 0.0-1.0",
                self.confidence
            ));
        }
        Ok(())
    }
}

impl ModelShape for Recipe {
    const SHAPE: &'static str = "recipe";

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("recipe name is empty".to_string());
        }
        Ok(())
    }
}

impl ModelShape for RecipeSet {
    const SHAPE: &'static str = "recipe list";

    fn check_value(value: &Value) -> Result<(), String> {
        if value.is_array() {
            Ok(())
        } else {
            Err(format!("expected a JSON array, got {}", json_kind(value)))
        }
    }

    fn validate(&self) -> Result<(), String> {
        for (i, recipe) in self.iter().enumerate() {
            recipe
                .validate()
                .map_err(|e| format!("recipe {}: {}", i + 1, e))?;
        }
        Ok(())
    }
}

/// Parse raw model output into a validated record
///
/// # Arguments
/// * `raw` - Text exactly as the model returned it
///
/// # Errors
/// * `ParseFailure::MalformedSyntax` if the content is not JSON
/// * `ParseFailure::Validation` if the JSON does not fit `T`
pub fn parse_model_text<T: ModelShape>(raw: &str) -> Result<T, ParseError> {
    let content = strip_code_fence(raw);

    if content.is_empty() {
        return Err(ParseError::syntax(raw, "response is empty"));
    }

    let value: Value =
        serde_json::from_str(content).map_err(|e| ParseError::syntax(raw, e.to_string()))?;

    T::check_value(&value).map_err(|e| ParseError::validation(raw, e))?;

    let record: T = serde_json::from_value(value)
        .map_err(|e| ParseError::validation(raw, format!("{}: {}", T::SHAPE, e)))?;

    record
        .validate()
        .map_err(|e| ParseError::validation(raw, e))?;

    Ok(record)
}

/// Remove a surrounding markdown code fence, if any
///
/// Only a fence opening at the very start is treated as enclosing. Content
/// runs up to the first closing fence line; whatever follows is dropped.
/// Text without an opening fence is returned trimmed, minus a stray
/// trailing fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();

    let Some(after_open) = text.strip_prefix(FENCE) else {
        return text.strip_suffix(FENCE).unwrap_or(text).trim();
    };

    // The opening line is the fence plus an optional language tag.
    let body = match after_open.split_once('\n') {
        Some((tag, rest)) if is_language_tag(tag) => rest,
        None if is_language_tag(after_open) => "",
        _ => after_open,
    };

    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim() == FENCE {
            return body[..offset].trim();
        }
        offset += line.len();
    }

    body.trim_end().strip_suffix(FENCE).unwrap_or(body).trim()
}

fn is_language_tag(s: &str) -> bool {
    s.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
