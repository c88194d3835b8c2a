//! Form state and submit lifecycle.

use std::fmt;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::client::{
    HttpClient, HttpResponse, Method, RequestBody, RequestConfig, RequestError, RequestOptions,
};
use crate::errors::{self, Errors};
use crate::multipart::MultipartForm;
use crate::value::{self, FormValue};

/// Synthetic multipart field carrying the tunnelled verb.
const METHOD_OVERRIDE_FIELD: &str = "_method";

type SuccessHook = Box<dyn Fn(&HttpResponse) + Send + Sync>;
type FailHook = Box<dyn Fn(&RequestError, &mut Errors) + Send + Sync>;

/// A set of form fields tracked against an immutable baseline.
///
/// The keys present at construction form a closed set: reads and writes
/// of any other name are silently absorbed, so incidental access can
/// never grow the payload or touch internal state. Construction
/// deep-copies the input into both the baseline and the live payload.
pub struct Form {
    original_data: BTreeMap<String, FormValue>,
    payload: BTreeMap<String, FormValue>,
    errors: Errors,
    is_pending: bool,
    success_hook: Option<SuccessHook>,
    fail_hook: Option<FailHook>,
}

impl Form {
    pub fn new(initial: impl IntoIterator<Item = (String, FormValue)>) -> Self {
        let original_data: BTreeMap<String, FormValue> = initial.into_iter().collect();
        // Structural deep copy, see FormValue::clone.
        let payload = original_data.clone();
        Self {
            original_data,
            payload,
            errors: Errors::new(),
            is_pending: false,
            success_hook: None,
            fail_hook: None,
        }
    }

    /// Build a form from a JSON object. Non-object values yield an empty
    /// form with no fields.
    pub fn from_json(initial: Value) -> Self {
        match initial {
            Value::Object(map) => Self::new(
                map.into_iter()
                    .map(|(key, value)| (key, FormValue::from(value))),
            ),
            _ => Self::new(std::iter::empty()),
        }
    }

    /// Current value of a field, `None` for names outside the field set.
    pub fn field(&self, name: &str) -> Option<&FormValue> {
        self.payload.get(name)
    }

    /// Write a field value. Names outside the construction key set are
    /// silently dropped to keep the field set closed.
    pub fn set(&mut self, name: &str, value: impl Into<FormValue>) {
        if !self.contains_field(name) {
            return;
        }
        self.payload.insert(name.to_string(), value.into());
    }

    /// Membership in the closed field set.
    pub fn contains_field(&self, name: &str) -> bool {
        self.original_data.contains_key(name)
    }

    pub fn payload(&self) -> &BTreeMap<String, FormValue> {
        &self.payload
    }

    pub fn original_data(&self) -> &BTreeMap<String, FormValue> {
        &self.original_data
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    /// Restore every field to its construction-time value and drop all
    /// recorded errors. The pending flag is left alone.
    pub fn reset(&mut self) {
        self.payload = self.original_data.clone();
        self.errors.clear();
    }

    /// True when any field, at any depth, holds a file handle.
    pub fn payload_has_files(&self) -> bool {
        self.payload.values().any(value::has_files)
    }

    /// Wire representation of the payload: plain JSON when file-free,
    /// otherwise a multipart container. Arrays append each element under
    /// `name[]`; nested-object bracket expansion is not implemented.
    pub fn form_data(&self) -> RequestBody {
        if !self.payload_has_files() {
            return RequestBody::Json(self.payload_json());
        }

        let mut form = MultipartForm::new();
        for (field, value) in &self.payload {
            match value {
                FormValue::Array(items) => {
                    let name = format!("{}[]", field);
                    for item in items {
                        form.append_value(&name, item);
                    }
                }
                other => form.append_value(field, other),
            }
        }
        RequestBody::Multipart(form)
    }

    fn payload_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (field, value) in &self.payload {
            map.insert(field.clone(), value.to_json_lossy());
        }
        Value::Object(map)
    }

    /// Replace the default no-op success hook.
    pub fn on_success(&mut self, hook: impl Fn(&HttpResponse) + Send + Sync + 'static) {
        self.success_hook = Some(Box::new(hook));
    }

    /// Replace the default failure hook (normalize the response body and
    /// record it into the error index).
    pub fn on_fail(&mut self, hook: impl Fn(&RequestError, &mut Errors) + Send + Sync + 'static) {
        self.fail_hook = Some(Box::new(hook));
    }

    /// Submit the payload.
    ///
    /// Clears stale errors, serializes the payload, tunnels non-POST
    /// verbs through POST when the body is multipart, dispatches through
    /// `client`, and routes the outcome through the success or failure
    /// hook. Failures are recorded into the error index and then returned
    /// to the caller, never swallowed. The pending flag covers exactly
    /// the span from entry to settle.
    pub async fn submit<C: HttpClient + ?Sized>(
        &mut self,
        client: &C,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        self.is_pending = true;
        self.errors.clear();
        log::debug!("submitting form: {} {}", method, url);

        let mut body = self.form_data();
        let mut send_method = method;
        if let RequestBody::Multipart(form) = &mut body {
            // Backends rarely parse multipart bodies for PUT/PATCH/DELETE;
            // tunnel the real verb through a POST.
            form.append_text(METHOD_OVERRIDE_FIELD, method.as_str());
            send_method = Method::Post;
        }

        let mut config = RequestConfig::new(send_method, url);
        match body {
            RequestBody::Json(json) if send_method == Method::Get => config.query = Some(json),
            other => config.body = Some(other),
        }
        let config = config.apply(options);

        let outcome = match client.request(config).await {
            Ok(response) => {
                self.handle_success(&response);
                Ok(response.data)
            }
            Err(error) => {
                self.handle_fail(&error);
                Err(error)
            }
        };
        self.is_pending = false;
        outcome
    }

    pub async fn get<C: HttpClient + ?Sized>(
        &mut self,
        client: &C,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        self.submit(client, Method::Get, url, options).await
    }

    pub async fn post<C: HttpClient + ?Sized>(
        &mut self,
        client: &C,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        self.submit(client, Method::Post, url, options).await
    }

    pub async fn put<C: HttpClient + ?Sized>(
        &mut self,
        client: &C,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        self.submit(client, Method::Put, url, options).await
    }

    pub async fn patch<C: HttpClient + ?Sized>(
        &mut self,
        client: &C,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        self.submit(client, Method::Patch, url, options).await
    }

    pub async fn delete<C: HttpClient + ?Sized>(
        &mut self,
        client: &C,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        self.submit(client, Method::Delete, url, options).await
    }

    fn handle_success(&mut self, response: &HttpResponse) {
        log::debug!("form submission succeeded with HTTP {}", response.status);
        if let Some(hook) = &self.success_hook {
            hook(response);
        }
    }

    fn handle_fail(&mut self, error: &RequestError) {
        log::error!("form submission failed: {}", error);
        match &self.fail_hook {
            Some(hook) => hook(error, &mut self.errors),
            None => {
                let body = error.response_body();
                self.errors.record(errors::from_response_body(&body));
            }
        }
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("original_data", &self.original_data)
            .field("payload", &self.payload)
            .field("errors", &self.errors)
            .field("is_pending", &self.is_pending)
            .finish_non_exhaustive()
    }
}
