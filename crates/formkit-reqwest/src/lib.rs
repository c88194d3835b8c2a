//! reqwest-backed [`HttpClient`] for formkit.
//!
//! Translates the engine's request descriptors into real HTTP requests.
//! Cross-cutting transport concerns (default headers, base URLs,
//! timeouts, proxies) belong on the `reqwest::Client` the caller passes
//! in, not here.

use async_trait::async_trait;
use formkit::{
    HttpClient, HttpResponse, Method, MultipartForm, MultipartPart, RequestBody, RequestConfig,
    RequestError,
};
use serde_json::Value;

pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a pre-configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Flatten a JSON object into query pairs. Query strings are key→value,
/// so a non-object payload cannot be encoded and is skipped.
fn query_pairs(query: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = query else {
        log::warn!("non-object query payload cannot be encoded, skipping");
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

fn to_reqwest_multipart(form: &MultipartForm) -> Result<reqwest::multipart::Form, RequestError> {
    let mut out = reqwest::multipart::Form::new();
    for (name, part) in form.parts() {
        out = match part {
            MultipartPart::Text(text) => out.text(name.to_string(), text.clone()),
            MultipartPart::File(file) => {
                let part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
                    .file_name(file.file_name().to_string())
                    .mime_str(file.mime_type())
                    .map_err(|e| {
                        RequestError::Network(format!("invalid MIME type for '{}': {}", name, e))
                    })?;
                out.part(name.to_string(), part)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(&self, config: RequestConfig) -> Result<HttpResponse, RequestError> {
        let mut request = self
            .client
            .request(to_reqwest_method(config.method), &config.url);

        if let Some(query) = &config.query {
            request = request.query(&query_pairs(query));
        }
        for (name, value) in &config.headers {
            request = request.header(name, value);
        }
        request = match config.body {
            Some(RequestBody::Json(json)) => request.json(&json),
            Some(RequestBody::Multipart(form)) => request.multipart(to_reqwest_multipart(&form)?),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        let status_code = response.status();
        let status = status_code.as_u16();
        // Error bodies carry the validation payload, decode both paths.
        let data = response.json::<Value>().await.unwrap_or(Value::Null);

        if !status_code.is_success() {
            return Err(RequestError::Status { status, body: data });
        }
        Ok(HttpResponse { status, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_query_pairs_flatten_scalars() {
        let pairs = query_pairs(&json!({"title": "A", "page": 2, "draft": true}));
        assert_eq!(
            pairs,
            vec![
                ("draft".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string()),
                ("title".to_string(), "A".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_skip_non_objects() {
        assert!(query_pairs(&json!("scalar")).is_empty());
    }
}
