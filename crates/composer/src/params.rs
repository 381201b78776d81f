//! Custom report parameters supplied as JSON object text.

use reportframe_core::ParameterError;
use serde_json::Value;

/// Flat string-keyed parameters, in the order the operator wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomParameters {
    pairs: Vec<(String, String)>,
}

impl CustomParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{"Year":"2024","Month":12}`.
    ///
    /// Scalars are stringified the way a browser would (`12` → `"12"`,
    /// `true` → `"true"`, `null` → `"null"`). Nested arrays and objects have
    /// no query-string form and are skipped. Blank text means no parameters.
    pub fn parse(text: &str) -> Result<Self, ParameterError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }

        let value: Value =
            serde_json::from_str(text).map_err(|e| ParameterError::Malformed(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ParameterError::NotAnObject(json_kind(&value)));
        };

        let mut pairs = Vec::with_capacity(map.len());
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => "null".into(),
                other => {
                    tracing::warn!(
                        key = %key,
                        kind = json_kind(&other),
                        "Skipping report parameter with non-scalar value"
                    );
                    continue;
                }
            };
            pairs.push((key, text));
        }

        Ok(Self { pairs })
    }

    /// Parse, logging and discarding malformed text instead of failing.
    pub fn parse_lenient(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid report parameters JSON, ignoring custom parameters");
            Self::new()
        })
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
