//! Per-call parameters.
//!
//! `CallParameters` is a bag of named JSON values plus caller header
//! overrides. Parameter names are the API's camelCase names (`userType`,
//! `ipAddresses`, `ifMatch`); the operation table maps them onto path
//! placeholders, query keys, body keys and headers.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Parameters for a single operation call. Never shared between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallParameters {
    values: Map<String, Value>,
    headers: Vec<(String, String)>,
}

impl CallParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter. A `Value::Null` is stored but treated as absent.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Set a parameter from any serializable model, e.g. an `AllowlistEntry`.
    pub fn with_json<T: Serialize>(self, name: impl Into<String>, value: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.with(name, value))
    }

    /// Add a caller header. Caller headers win over every computed header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Parse parameters from a JSON object.
    ///
    /// A top-level `"headers"` member, if present, must be an object of
    /// strings and becomes the caller header overrides.
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        let mut values = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ApiError::InvalidParameter {
                    name: "params".to_string(),
                    reason: format!("expected a JSON object, got {}", json_kind(&other)),
                })
            }
        };

        let mut headers = Vec::new();
        match values.remove("headers") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                for (name, value) in map {
                    match value {
                        Value::String(s) => headers.push((name, s)),
                        other => {
                            return Err(ApiError::InvalidParameter {
                                name: format!("headers.{name}"),
                                reason: format!("expected a string, got {}", json_kind(&other)),
                            })
                        }
                    }
                }
            }
            Some(other) => {
                return Err(ApiError::InvalidParameter {
                    name: "headers".to_string(),
                    reason: format!("expected an object, got {}", json_kind(&other)),
                })
            }
        }

        Ok(Self { values, headers })
    }

    /// The value for `name`, or `None` when absent or `null`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The subset of `required` that is absent, in the given order.
    pub(crate) fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.contains(name))
            .map(|name| name.to_string())
            .collect()
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
