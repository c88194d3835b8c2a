//! Form state and submission engine.
//!
//! Wraps a mutable set of form fields, tracks their values against an
//! immutable baseline, submits them over HTTP through an abstract
//! [`HttpClient`], and maps server-side validation failures back onto
//! individual fields via [`Errors`].
//!
//! The crate is transport-agnostic; see `formkit-reqwest` for a default
//! client implementation.

pub mod client;
pub mod errors;
pub mod form;
pub mod multipart;
pub mod value;

pub use client::{
    HttpClient, HttpResponse, Method, RequestBody, RequestConfig, RequestError, RequestOptions,
};
pub use errors::{Errors, FieldErrors};
pub use form::Form;
pub use multipart::{MultipartForm, MultipartPart};
pub use value::{FilePart, FormValue};
