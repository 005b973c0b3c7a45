//! Call descriptors.

use crate::RequestOption;
use courier_core::ApiResponse;
use courier_error::CourierResult;
use reqwest::Method;
use std::sync::Arc;

/// Inspects a final response for a service-reported error before decoding.
///
/// Return a [`ServiceError`](courier_error::ServiceError) to fail the call
/// with it. Any other error kind is reported as a hook failure.
pub type ErrorSniffer = Arc<dyn Fn(&ApiResponse) -> CourierResult<()> + Send + Sync>;

/// Runs after decoding with the response and, for decoding calls, the payload.
pub type AfterResponseHook<Resp> =
    Box<dyn Fn(&ApiResponse, Option<&mut Resp>) -> CourierResult<()> + Send + Sync>;

/// Everything the pipeline needs to run one logical call.
pub struct CallDescriptor<Req, Resp> {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) payload: Option<Req>,
    pub(crate) decode: bool,
    pub(crate) options: Vec<Box<dyn RequestOption>>,
    pub(crate) sniffer: Option<ErrorSniffer>,
    pub(crate) hooks: Vec<AfterResponseHook<Resp>>,
}

impl<Req, Resp> std::fmt::Debug for CallDescriptor<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("has_payload", &self.payload.is_some())
            .field("decode", &self.decode)
            .field("options", &self.options.len())
            .field("sniffer", &self.sniffer.is_some())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl<Req, Resp> CallDescriptor<Req, Resp> {
    /// Describe a call without payload, options or hooks.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
            decode: false,
            options: Vec::new(),
            sniffer: None,
            hooks: Vec::new(),
        }
    }

    /// Attach a request payload.
    pub fn payload(mut self, payload: Req) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Decode the response body into `Resp`.
    pub fn decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    /// Append a request option.
    pub fn option(mut self, option: impl RequestOption + 'static) -> Self {
        self.options.push(Box::new(option));
        self
    }

    /// Install the error sniffer.
    pub fn error_sniffer(mut self, sniffer: ErrorSniffer) -> Self {
        self.sniffer = Some(sniffer);
        self
    }

    /// Append a post-response hook.
    pub fn after_response(mut self, hook: AfterResponseHook<Resp>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the client's base address.
    pub fn path(&self) -> &str {
        &self.path
    }
}
