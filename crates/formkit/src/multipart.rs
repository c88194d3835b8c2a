//! Transport-level multipart container model.
//!
//! An ordered list of named parts, built by the form when a payload
//! carries files. Adapters translate it into their client's native
//! multipart type; the container never inspects file contents.

use crate::value::{self, FilePart, FormValue};

/// One named entry in a multipart body.
#[derive(Clone, Debug, PartialEq)]
pub enum MultipartPart {
    Text(String),
    File(FilePart),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<(String, MultipartPart)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.parts.push((name.into(), MultipartPart::Text(text.into())));
    }

    pub fn append_file(&mut self, name: impl Into<String>, file: FilePart) {
        self.parts.push((name.into(), MultipartPart::File(file)));
    }

    /// Append a field value: file handles become file parts, everything
    /// else its text rendering. Files nested inside a structure have no
    /// flat encoding without bracket expansion and degrade to their name.
    pub fn append_value(&mut self, name: &str, value: &FormValue) {
        match value {
            FormValue::File(file) => self.append_file(name, file.clone()),
            other => {
                if value::has_files(other) {
                    log::warn!(
                        "multipart field '{}' nests files inside a structure; encoding them by file name",
                        name
                    );
                }
                self.append_text(name, other.to_text());
            }
        }
    }

    pub fn parts(&self) -> impl Iterator<Item = (&str, &MultipartPart)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(part_name, _)| part_name == name)
    }

    /// First text part stored under `name`, if any.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(part_name, part)| match part {
            MultipartPart::Text(text) if part_name == name => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_value_splits_text_and_files() {
        let mut form = MultipartForm::new();
        form.append_value("title", &FormValue::from("A"));
        form.append_value(
            "upload",
            &FormValue::File(FilePart::new("foo.txt", "text/plain", b"foo".to_vec())),
        );

        assert_eq!(form.len(), 2);
        assert_eq!(form.text("title"), Some("A"));
        assert!(matches!(
            form.parts().nth(1),
            Some(("upload", MultipartPart::File(_)))
        ));
    }

    #[test]
    fn test_structures_render_as_json_text() {
        let mut form = MultipartForm::new();
        form.append_value("meta", &FormValue::from(json!({"draft": true})));
        assert_eq!(form.text("meta"), Some("{\"draft\":true}"));
    }

    #[test]
    fn test_lookup_on_missing_name() {
        let form = MultipartForm::new();
        assert!(form.is_empty());
        assert!(!form.contains("missing"));
        assert_eq!(form.text("missing"), None);
    }
}
