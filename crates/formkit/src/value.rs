//! Dynamic field value model.
//!
//! A form payload is a string-keyed map of [`FormValue`]s: JSON-shaped
//! data plus an opaque binary [`FilePart`] leaf that JSON cannot carry.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

/// Opaque binary file handle attached to a form field.
///
/// The bytes sit behind an `Arc`: deep-copying a payload shares the
/// underlying file instead of duplicating its content.
#[derive(Clone, Debug, PartialEq)]
pub struct FilePart {
    file_name: String,
    mime_type: String,
    bytes: Arc<Vec<u8>>,
}

impl FilePart {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Value of a single form field.
#[derive(Debug, PartialEq)]
pub enum FormValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<FormValue>),
    Object(BTreeMap<String, FormValue>),
    File(FilePart),
}

// Structural deep copy: containers are rebuilt element by element, file
// handles are shared by reference since they stand for external resources.
impl Clone for FormValue {
    fn clone(&self) -> Self {
        match self {
            FormValue::Null => FormValue::Null,
            FormValue::Bool(flag) => FormValue::Bool(*flag),
            FormValue::Number(number) => FormValue::Number(number.clone()),
            FormValue::String(text) => FormValue::String(text.clone()),
            FormValue::Array(items) => {
                FormValue::Array(items.iter().map(FormValue::clone).collect())
            }
            FormValue::Object(map) => FormValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            FormValue::File(file) => FormValue::File(file.clone()),
        }
    }
}

impl FormValue {
    /// JSON representation, or `None` if the value holds a file anywhere.
    pub fn as_json(&self) -> Option<Value> {
        match self {
            FormValue::Null => Some(Value::Null),
            FormValue::Bool(flag) => Some(Value::Bool(*flag)),
            FormValue::Number(number) => Some(Value::Number(number.clone())),
            FormValue::String(text) => Some(Value::String(text.clone())),
            FormValue::Array(items) => items
                .iter()
                .map(FormValue::as_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            FormValue::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), value.as_json()?);
                }
                Some(Value::Object(out))
            }
            FormValue::File(_) => None,
        }
    }

    /// JSON representation where file handles degrade to their file name.
    pub fn to_json_lossy(&self) -> Value {
        match self {
            FormValue::File(file) => Value::String(file.file_name().to_string()),
            FormValue::Array(items) => {
                Value::Array(items.iter().map(FormValue::to_json_lossy).collect())
            }
            FormValue::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), value.to_json_lossy());
                }
                Value::Object(out)
            }
            other => other.as_json().unwrap_or(Value::Null),
        }
    }

    /// Text rendering used for multipart parts: strings go raw, everything
    /// else as its JSON text.
    pub fn to_text(&self) -> String {
        match self {
            FormValue::String(text) => text.clone(),
            other => other.to_json_lossy().to_string(),
        }
    }
}

/// Recursive file-detection predicate.
///
/// True for a file handle itself, and for any array or object that holds
/// one at any depth. Every other variant is file-free.
pub fn has_files(value: &FormValue) -> bool {
    match value {
        FormValue::File(_) => true,
        FormValue::Array(items) => items.iter().any(has_files),
        FormValue::Object(map) => map.values().any(has_files),
        _ => false,
    }
}

impl From<Value> for FormValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FormValue::Null,
            Value::Bool(flag) => FormValue::Bool(flag),
            Value::Number(number) => FormValue::Number(number),
            Value::String(text) => FormValue::String(text),
            Value::Array(items) => {
                FormValue::Array(items.into_iter().map(FormValue::from).collect())
            }
            Value::Object(map) => FormValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, FormValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        FormValue::String(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        FormValue::String(text)
    }
}

impl From<bool> for FormValue {
    fn from(flag: bool) -> Self {
        FormValue::Bool(flag)
    }
}

impl From<i64> for FormValue {
    fn from(number: i64) -> Self {
        FormValue::Number(number.into())
    }
}

impl From<u64> for FormValue {
    fn from(number: u64) -> Self {
        FormValue::Number(number.into())
    }
}

impl From<f64> for FormValue {
    fn from(number: f64) -> Self {
        match serde_json::Number::from_f64(number) {
            Some(number) => FormValue::Number(number),
            None => FormValue::Null,
        }
    }
}

impl From<FilePart> for FormValue {
    fn from(file: FilePart) -> Self {
        FormValue::File(file)
    }
}

impl From<Vec<FormValue>> for FormValue {
    fn from(items: Vec<FormValue>) -> Self {
        FormValue::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file() -> FilePart {
        FilePart::new("foo.txt", "text/plain", b"foo bar".to_vec())
    }

    #[test]
    fn test_has_files_detects_file_inside_array() {
        let value = FormValue::Array(vec![FormValue::File(file()), FormValue::from("x")]);
        assert!(has_files(&value));
    }

    #[test]
    fn test_has_files_false_for_plain_data() {
        let value = FormValue::from(json!({"a": "x", "b": {"c": 1}}));
        assert!(!has_files(&value));
    }

    #[test]
    fn test_has_files_reaches_arbitrary_depth() {
        let value = FormValue::from(json!({"a": {"b": [1, 2]}}));
        assert!(!has_files(&value));

        let mut inner = BTreeMap::new();
        inner.insert(
            "b".to_string(),
            FormValue::Array(vec![FormValue::File(file())]),
        );
        let mut outer = BTreeMap::new();
        outer.insert("a".to_string(), FormValue::Object(inner));
        assert!(has_files(&FormValue::Object(outer)));
    }

    #[test]
    fn test_clone_shares_file_bytes() {
        let original = FormValue::File(file());
        let copy = original.clone();
        match (&original, &copy) {
            (FormValue::File(a), FormValue::File(b)) => {
                assert_eq!(a.bytes().as_ptr(), b.bytes().as_ptr());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let json = json!({"title": "A", "tags": [1, 2], "meta": {"draft": true}});
        let value = FormValue::from(json.clone());
        assert_eq!(value.as_json(), Some(json));
    }

    #[test]
    fn test_as_json_refuses_files() {
        let value = FormValue::Array(vec![FormValue::File(file())]);
        assert_eq!(value.as_json(), None);
    }

    #[test]
    fn test_to_text_renders_strings_raw() {
        assert_eq!(FormValue::from("plain").to_text(), "plain");
        assert_eq!(FormValue::from(5i64).to_text(), "5");
        assert_eq!(FormValue::Null.to_text(), "null");
        assert_eq!(
            FormValue::from(json!({"a": 1})).to_text(),
            "{\"a\":1}"
        );
    }
}
