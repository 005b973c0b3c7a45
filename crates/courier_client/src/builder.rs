//! Typed request builder.

use crate::{CallDescriptor, Client, RequestOption};
use courier_core::{ApiResponse, Codec, JsonCodec};
use courier_error::{CourierResult, DecodeError};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds one logical call with request payload type `Req` and response
/// payload type `Resp`.
///
/// The builder only assembles a [`CallDescriptor`]; nothing touches the
/// network until one of the terminal operations runs it through
/// [`Client::execute`].
///
/// # Example
///
/// ```no_run
/// use courier_client::{Client, RequestBuilder};
/// use courier_client::options::with_query;
/// use serde::Deserialize;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Debug, Deserialize)]
/// struct Breeds {
///     data: Vec<serde_json::Value>,
/// }
///
/// # async fn run(client: Client) -> courier_error::CourierResult<()> {
/// let (response, breeds) = RequestBuilder::<(), Breeds>::get(&client, "/breeds")
///     .option(with_query(&[("limit", "5")]))
///     .execute_decoding(&CancellationToken::new())
///     .await?;
/// println!("{}: {} breeds", response.status(), breeds.data.len());
/// # Ok(())
/// # }
/// ```
pub struct RequestBuilder<'c, Req, Resp, C: Codec = JsonCodec> {
    client: &'c Client<C>,
    descriptor: CallDescriptor<Req, Resp>,
}

impl<Req, Resp, C: Codec> std::fmt::Debug for RequestBuilder<'_, Req, Resp, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<'c, Resp, C: Codec> RequestBuilder<'c, (), Resp, C> {
    /// `GET path`.
    pub fn get(client: &'c Client<C>, path: impl Into<String>) -> Self {
        Self::method(client, Method::GET, path, None)
    }

    /// `HEAD path`.
    pub fn head(client: &'c Client<C>, path: impl Into<String>) -> Self {
        Self::method(client, Method::HEAD, path, None)
    }

    /// `DELETE path`.
    pub fn delete(client: &'c Client<C>, path: impl Into<String>) -> Self {
        Self::method(client, Method::DELETE, path, None)
    }
}

impl<'c, Req, Resp, C: Codec> RequestBuilder<'c, Req, Resp, C> {
    /// `POST path` with `payload`.
    pub fn post(client: &'c Client<C>, path: impl Into<String>, payload: Req) -> Self {
        Self::method(client, Method::POST, path, Some(payload))
    }

    /// `PUT path` with `payload`.
    pub fn put(client: &'c Client<C>, path: impl Into<String>, payload: Req) -> Self {
        Self::method(client, Method::PUT, path, Some(payload))
    }

    /// `PATCH path` with `payload`.
    pub fn patch(client: &'c Client<C>, path: impl Into<String>, payload: Req) -> Self {
        Self::method(client, Method::PATCH, path, Some(payload))
    }

    /// Any method. Payloads given to `GET` or `HEAD` are not sent.
    pub fn method(
        client: &'c Client<C>,
        method: Method,
        path: impl Into<String>,
        payload: Option<Req>,
    ) -> Self {
        let mut descriptor = CallDescriptor::new(method, path);
        descriptor.payload = payload;
        Self { client, descriptor }
    }

    /// Append a per-call option.
    pub fn option(mut self, option: impl RequestOption + 'static) -> Self {
        self.descriptor.options.push(Box::new(option));
        self
    }

    /// Append several per-call options.
    pub fn options(mut self, options: impl IntoIterator<Item = Box<dyn RequestOption>>) -> Self {
        self.descriptor.options.extend(options);
        self
    }

    /// Check the final response for a service-reported error before decoding.
    pub fn error_sniffer<F>(mut self, sniffer: F) -> Self
    where
        F: Fn(&ApiResponse) -> CourierResult<()> + Send + Sync + 'static,
    {
        self.descriptor.sniffer = Some(Arc::new(sniffer));
        self
    }

    /// Run `hook` after decoding. Hooks run in the order added.
    pub fn after_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ApiResponse, Option<&mut Resp>) -> CourierResult<()> + Send + Sync + 'static,
    {
        self.descriptor.hooks.push(Box::new(hook));
        self
    }

    /// The descriptor built so far.
    pub fn into_descriptor(self) -> CallDescriptor<Req, Resp> {
        self.descriptor
    }
}

impl<Req, Resp, C> RequestBuilder<'_, Req, Resp, C>
where
    Req: Serialize,
    Resp: DeserializeOwned,
    C: Codec,
{
    /// Run the call without decoding the body.
    ///
    /// # Errors
    ///
    /// Any failure of the pipeline: cancellation, transport, breaker
    /// rejection, request construction, a sniffed service error or a hook.
    pub async fn execute_discarding_body(
        self,
        cancel: &CancellationToken,
    ) -> CourierResult<ApiResponse> {
        let descriptor = self.descriptor.decode(false);
        let (response, _) = self.client.execute(descriptor, cancel).await?;
        Ok(response)
    }

    /// Run the call and decode the body into `Resp`.
    ///
    /// # Errors
    ///
    /// As [`execute_discarding_body`](Self::execute_discarding_body), plus
    /// [`DecodeError`] when the body does not decode.
    pub async fn execute_decoding(
        self,
        cancel: &CancellationToken,
    ) -> CourierResult<(ApiResponse, Resp)> {
        let descriptor = self.descriptor.decode(true);
        match self.client.execute(descriptor, cancel).await? {
            (response, Some(payload)) => Ok((response, payload)),
            (_, None) => Err(DecodeError::new("decoding call produced no payload").into()),
        }
    }
}
