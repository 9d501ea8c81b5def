//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! The core describes the outbound POST as plain data and reads the answer
//! back as plain data. Whoever hosts the core executes the request, either
//! directly through an [`HttpClient`] implementation or across the C ABI.
//!
//! All fields use owned types so values can cross FFI boundaries without
//! lifetime concerns. The response body is kept as bytes; only structured
//! decoding interprets it.

use crate::error::TransportError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A form POST described as plain data. The method is always POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// An HTTP response described as plain data, body fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Executes a single POST. Implementations must not retry, must return
/// non-2xx answers as responses, not errors, and must not cap the body size.
pub trait HttpClient {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).post(request)
    }
}
