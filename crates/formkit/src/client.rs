//! Abstract HTTP capability consumed by the form engine.
//!
//! The engine builds a [`RequestConfig`] and hands it to whatever
//! [`HttpClient`] the caller supplies. Header injection, base URLs,
//! retries, timeouts and cancellation are all the client's concern.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::multipart::MultipartForm;

/// HTTP verbs the form can submit with.
///
/// GET and POST are sent as-is; PUT, PATCH and DELETE are tunnelled
/// through POST whenever the payload is multipart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized payload placed in the request.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

/// Descriptor handed to the HTTP client.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestConfig {
    pub url: String,
    pub method: Method,
    /// Query parameters; the form puts the JSON payload here for GET.
    pub query: Option<Value>,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            query: None,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Merge caller overrides in; set options win over computed fields,
    /// headers are appended.
    pub fn apply(mut self, options: RequestOptions) -> Self {
        if let Some(url) = options.url {
            self.url = url;
        }
        if let Some(method) = options.method {
            self.method = method;
        }
        if let Some(query) = options.query {
            self.query = Some(query);
        }
        if let Some(body) = options.body {
            self.body = Some(body);
        }
        self.headers.extend(options.headers);
        self
    }
}

/// Caller-side overrides merged into the computed descriptor on submit.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    url: Option<String>,
    method: Option<Method>,
    query: Option<Value>,
    body: Option<RequestBody>,
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub data: Value,
}

/// What a submission can fail with. Always re-propagated to the caller
/// after the error index is updated; the engine never retries.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RequestError {
    /// Transport-level failure; the request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx response with its decoded body.
    #[error("HTTP {status}")]
    Status { status: u16, body: Value },
}

impl RequestError {
    /// Response body carried by the failure; an empty object when the
    /// failure never reached the server.
    pub fn response_body(&self) -> Value {
        match self {
            RequestError::Status { body, .. } => body.clone(),
            RequestError::Network(_) => Value::Object(serde_json::Map::new()),
        }
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(&self, config: RequestConfig) -> Result<HttpResponse, RequestError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_override_computed_fields() {
        let config = RequestConfig::new(Method::Get, "/api/items")
            .apply(
                RequestOptions::new()
                    .method(Method::Delete)
                    .url("/api/other")
                    .header("X-Request-Id", "1"),
            );

        assert_eq!(config.method, Method::Delete);
        assert_eq!(config.url, "/api/other");
        assert_eq!(
            config.headers,
            vec![("X-Request-Id".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_empty_options_change_nothing() {
        let mut base = RequestConfig::new(Method::Post, "/api/items");
        base.body = Some(RequestBody::Json(json!({"a": 1})));
        let merged = base.clone().apply(RequestOptions::new());
        assert_eq!(merged, base);
    }

    #[test]
    fn test_network_failure_has_empty_body() {
        let error = RequestError::Network("connection refused".to_string());
        assert_eq!(error.response_body(), json!({}));
    }

    #[test]
    fn test_status_failure_exposes_body() {
        let error = RequestError::Status {
            status: 422,
            body: json!({"errors": {"field": ["Error message"]}}),
        };
        assert_eq!(
            error.response_body(),
            json!({"errors": {"field": ["Error message"]}})
        );
        assert_eq!(error.to_string(), "HTTP 422");
    }
}
