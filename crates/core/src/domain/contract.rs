use crate::domain::error::ValidationError;
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Decodes a request body into a JSON object.
///
/// Missing, malformed and non-object bodies all decode to an empty object, so a
/// bad body surfaces later as a regular validation failure and never as a parse
/// error of its own. A number outside the f64 range (e.g. `1e400`) makes
/// serde_json reject the document, so such a body also decodes to `{}`.
/// [`ReturnsInput::from_body`] does not go through here and reports that case
/// as an invalid element instead.
pub fn parse_payload(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "payload is not an object; using {{}}");
            Map::new()
        }
        Err(e) => {
            if !body.is_empty() {
                tracing::debug!(error = %e, "payload is not valid JSON; using {{}}");
            }
            Map::new()
        }
    }
}

/// `returns` from the payload, an empty array when absent.
pub fn take_returns(payload: &mut Map<String, Value>) -> Value {
    payload
        .remove("returns")
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

/// A validated series of at least two finite returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsInput {
    values: Vec<f64>,
}

impl ReturnsInput {
    pub const MIN_LEN: usize = 2;

    /// `returns` is read as raw JSON, so numbers are only decoded element by
    /// element and an out-of-range number invalidates that element rather than
    /// the whole payload.
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let returns = match serde_json::from_slice::<HashMap<String, Box<RawValue>>>(body) {
            Ok(mut payload) => payload.remove("returns"),
            Err(e) => {
                if !body.is_empty() {
                    tracing::debug!(error = %e, "payload is not a JSON object; using {{}}");
                }
                None
            }
        };

        match returns {
            Some(raw) => Self::try_from_raw(&raw),
            None => Self::try_from_values(Vec::new()),
        }
    }

    /// Checks run in order: array shape, element types, length.
    pub fn try_from_raw(returns: &RawValue) -> Result<Self, ValidationError> {
        let items = serde_json::from_str::<Vec<&RawValue>>(returns.get())
            .map_err(|_| ValidationError::InvalidType)?;

        // Deserializing into f64 rejects booleans, strings, null and nested
        // values, as well as numbers that overflow.
        let values = items
            .iter()
            .map(|item| serde_json::from_str::<f64>(item.get()))
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| ValidationError::InvalidType)?;

        Self::try_from_values(values)
    }

    pub fn try_from_values(values: Vec<f64>) -> Result<Self, ValidationError> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::InvalidType);
        }
        if values.len() < Self::MIN_LEN {
            return Err(ValidationError::InsufficientData);
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
