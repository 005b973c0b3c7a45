//! Per-call request options.
//!
//! Options run after the request is built and default headers are applied,
//! in the order they were added. A failing option aborts the call with an
//! [`OptionApplyError`].

use crate::HttpRequest;
use bytes::Bytes;
use courier_error::{CourierResult, OptionApplyError};
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A mutation applied to an outgoing request.
///
/// Implemented for closures, so one-off options need no type of their own:
///
/// ```
/// use courier_client::{HttpRequest, RequestOption};
/// use reqwest::{Method, Url};
///
/// let option = |request: &mut HttpRequest| -> courier_error::CourierResult<()> {
///     request.url_mut().set_fragment(Some("top"));
///     Ok(())
/// };
/// let mut request = HttpRequest::new(Method::GET, Url::parse("https://example.com/").unwrap());
/// option.apply(&mut request).unwrap();
/// assert_eq!(request.url().fragment(), Some("top"));
/// ```
pub trait RequestOption: Send + Sync {
    /// Apply the option.
    fn apply(&self, request: &mut HttpRequest) -> CourierResult<()>;
}

impl<F> RequestOption for F
where
    F: Fn(&mut HttpRequest) -> CourierResult<()> + Send + Sync,
{
    fn apply(&self, request: &mut HttpRequest) -> CourierResult<()> {
        self(request)
    }
}

/// Sets headers, replacing existing values for the same names.
#[derive(Debug, Clone)]
pub struct HeaderOption {
    headers: Vec<(String, String)>,
}

impl RequestOption for HeaderOption {
    fn apply(&self, request: &mut HttpRequest) -> CourierResult<()> {
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                OptionApplyError::new("with_header", format!("invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                OptionApplyError::new("with_header", format!("invalid value for '{}': {}", name, e))
            })?;
            request.headers_mut().insert(name, value);
        }
        Ok(())
    }
}

/// Set one header.
pub fn with_header(name: impl Into<String>, value: impl Into<String>) -> HeaderOption {
    HeaderOption {
        headers: vec![(name.into(), value.into())],
    }
}

/// Set several headers.
pub fn with_headers<I, K, V>(headers: I) -> HeaderOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    HeaderOption {
        headers: headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    }
}

/// Appends URL-encoded query pairs.
#[derive(Debug, Clone)]
pub struct QueryOption {
    encoded: Result<String, String>,
}

impl RequestOption for QueryOption {
    fn apply(&self, request: &mut HttpRequest) -> CourierResult<()> {
        let encoded = self
            .encoded
            .as_deref()
            .map_err(|e| OptionApplyError::new("with_query", e.to_string()))?;
        if encoded.is_empty() {
            return Ok(());
        }
        let url = request.url_mut();
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, encoded),
            _ => encoded.to_string(),
        };
        url.set_query(Some(&query));
        Ok(())
    }
}

/// Append `params` to the query string.
///
/// `params` is encoded right away; an encoding failure surfaces when the
/// option is applied.
///
/// ```
/// use courier_client::HttpRequest;
/// use courier_client::options::{RequestOption, with_query};
/// use reqwest::{Method, Url};
///
/// let mut request = HttpRequest::new(Method::GET, Url::parse("https://example.com/facts?page=2").unwrap());
/// with_query(&[("limit", "5")]).apply(&mut request).unwrap();
/// assert_eq!(request.url().query(), Some("page=2&limit=5"));
/// ```
pub fn with_query<T: Serialize + ?Sized>(params: &T) -> QueryOption {
    QueryOption {
        encoded: serde_urlencoded::to_string(params).map_err(|e| e.to_string()),
    }
}

/// Replaces the body with a URL-encoded form.
#[derive(Debug, Clone)]
pub struct FormOption {
    encoded: Result<Bytes, String>,
}

impl RequestOption for FormOption {
    fn apply(&self, request: &mut HttpRequest) -> CourierResult<()> {
        let body = self
            .encoded
            .clone()
            .map_err(|e| OptionApplyError::new("with_form", e))?;
        request.set_body(body, HeaderValue::from_static(FORM_CONTENT_TYPE));
        Ok(())
    }
}

/// Send `form` as an `application/x-www-form-urlencoded` body.
pub fn with_form<T: Serialize + ?Sized>(form: &T) -> FormOption {
    FormOption {
        encoded: serde_urlencoded::to_string(form)
            .map(Bytes::from)
            .map_err(|e| e.to_string()),
    }
}
