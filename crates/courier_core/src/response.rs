//! Buffered HTTP responses.

use bytes::Bytes;
use derive_getters::Getters;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url, Version};
use std::fmt::Write as _;

/// An HTTP response whose body has been read in full.
///
/// Transports read the body before handing the response to the pipeline, so
/// the underlying network stream is already released by the time retry
/// conditions, hooks or decoders look at it.
///
/// # Example
///
/// ```
/// use courier_core::ApiResponse;
/// use reqwest::StatusCode;
///
/// let response = ApiResponse::new(StatusCode::OK, r#"{"fact":"cats sleep"}"#)
///     .with_header("content-type", "application/json");
/// assert!(response.is_success());
/// assert_eq!(response.text(), r#"{"fact":"cats sleep"}"#);
/// ```
#[derive(Debug, Clone, Getters)]
pub struct ApiResponse {
    /// Response status
    status: StatusCode,
    /// HTTP version the response was received over
    version: Version,
    /// Response headers
    headers: HeaderMap,
    /// Final URL of the response, when known
    url: Option<Url>,
    /// Buffered response body
    body: Bytes,
}

impl ApiResponse {
    /// Create a response with the given status and body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            url: None,
            body: body.into(),
        }
    }

    /// Create a response from its parts.
    pub fn from_parts(
        status: StatusCode,
        version: Version,
        headers: HeaderMap,
        url: Option<Url>,
        body: Bytes,
    ) -> Self {
        Self {
            status,
            version,
            headers,
            url,
            body,
        }
    }

    /// Add a header.
    ///
    /// Names or values that are not valid HTTP header tokens are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set the response URL.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Full textual representation: status line, headers, blank line, body.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:?} {}", self.version, self.status);
        for (name, value) in &self.headers {
            let _ = writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        }
        out.push('\n');
        out.push_str(&self.text());
        out
    }
}
