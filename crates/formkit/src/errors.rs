//! Per-field validation-error index.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Validation messages recorded for one field: a single message or an
/// ordered list, matching both shapes servers send.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    One(String),
    Many(Vec<String>),
}

impl FieldErrors {
    /// First message of a list, or the single message itself.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldErrors::One(message) => Some(message),
            FieldErrors::Many(messages) => messages.first().map(String::as_str),
        }
    }
}

/// Field name → messages store. Recording always replaces the whole
/// mapping; a missing key means "no error for that field".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Errors {
    errors: BTreeMap<String, FieldErrors>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(errors: BTreeMap<String, FieldErrors>) -> Self {
        Self { errors }
    }

    /// Replace the entire mapping (full replace, not merge).
    pub fn record(&mut self, errors: BTreeMap<String, FieldErrors>) {
        self.errors = errors;
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn any(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldErrors> {
        self.errors.get(field)
    }

    pub fn get_first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldErrors::first)
    }

    /// Remove one field's errors, leaving the rest untouched.
    pub fn clear_field(&mut self, field: &str) {
        self.errors.remove(field);
    }

    /// Drop every recorded error.
    pub fn clear(&mut self) {
        self.record(BTreeMap::new());
    }
}

/// Normalize a server error response body into a recordable mapping.
///
/// Takes the sub-object under an `errors` key when present, otherwise the
/// whole body. Values that are neither a string nor a string list are
/// stringified into a single message; a non-object body yields an empty
/// mapping.
pub fn from_response_body(body: &Value) -> BTreeMap<String, FieldErrors> {
    let source = match body.get("errors") {
        Some(nested) => nested,
        None => body,
    };

    let mut out = BTreeMap::new();
    if let Value::Object(map) = source {
        for (field, value) in map {
            let parsed = serde_json::from_value::<FieldErrors>(value.clone())
                .unwrap_or_else(|_| FieldErrors::One(value.to_string()));
            out.insert(field.clone(), parsed);
        }
    }
    out
}
