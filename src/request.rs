//! Invocation request bodies.
//!
//! Bodies are kept as untyped JSON. The mock accepts any shape and only
//! projects `messages` or `prompt` to size the input.

use crate::error::MockError;
use serde_json::Value;

/// Maximum number of characters of the body echoed into the request log.
pub const LOG_PREVIEW_CHARS: usize = 200;

/// A parsed invocation body.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    body: Value,
}

impl InvocationRequest {
    /// Parse a raw request body.
    ///
    /// An empty body, or a literal JSON `null`, is treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Validation`] if the body is non-empty and not
    /// valid JSON.
    pub fn parse(raw: &[u8]) -> Result<Self, MockError> {
        if raw.is_empty() {
            return Ok(Self::empty());
        }
        let body: Value = serde_json::from_slice(raw)
            .map_err(|e| MockError::Validation(format!("Invalid JSON: {e}")))?;
        if body.is_null() {
            return Ok(Self::empty());
        }
        Ok(Self { body })
    }

    /// `{}`
    pub fn empty() -> Self {
        Self {
            body: Value::Object(serde_json::Map::new()),
        }
    }

    /// The raw JSON document.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The field used to size the input: `messages` if set, else `prompt`.
    ///
    /// A field counts as set unless it is missing, `null`, `false`, `0` or
    /// an empty string.
    pub fn prompt_source(&self) -> Option<&Value> {
        ["messages", "prompt"]
            .into_iter()
            .filter_map(|key| self.body.get(key))
            .find(|value| is_set(value))
    }

    /// Compact JSON encoding of [`prompt_source`](Self::prompt_source), or
    /// `""` (the encoded empty string) when neither field is set.
    ///
    /// Integral floats are written without a fraction (`1.0` as `1`), the
    /// way JavaScript clients encode them.
    pub fn prompt_text(&self) -> String {
        match self.prompt_source() {
            Some(value) => integral_floats_as_ints(value).to_string(),
            None => Value::String(String::new()).to_string(),
        }
    }

    /// Serialized body truncated to `max_chars`, suffixed with `...`.
    pub fn log_preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.body.to_string().chars().take(max_chars).collect();
        preview.push_str("...");
        preview
    }
}

fn integral_floats_as_ints(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map_or_else(|| value.clone(), |f| Value::from(f as i64)),
        Value::Array(items) => Value::Array(items.iter().map(integral_floats_as_ints).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), integral_floats_as_ints(v)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
