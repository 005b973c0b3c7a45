//! The client handle.

use crate::{ClientBuilder, ClientConfig, RequestBuilder};
use courier_core::{Codec, JsonCodec};
use reqwest::Method;
use std::sync::Arc;

/// A configured API client.
///
/// Cheap to clone; clones share configuration, admission state, breaker and
/// any client-wide retry counter. Service wrappers typically hold one and
/// expose one method per endpoint.
pub struct Client<C: Codec = JsonCodec> {
    config: Arc<ClientConfig<C>>,
}

impl<C: Codec> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: Codec> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish()
    }
}

impl Client<JsonCodec> {
    /// Start configuring a client.
    pub fn builder() -> ClientBuilder<JsonCodec> {
        ClientBuilder::default()
    }
}

impl<C: Codec> Client<C> {
    pub(crate) fn from_config(config: ClientConfig<C>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Configuration shared by every call.
    pub fn config(&self) -> &ClientConfig<C> {
        &self.config
    }

    /// `GET path`.
    pub fn get<Resp>(&self, path: &str) -> RequestBuilder<'_, (), Resp, C> {
        RequestBuilder::get(self, path)
    }

    /// `HEAD path`.
    pub fn head<Resp>(&self, path: &str) -> RequestBuilder<'_, (), Resp, C> {
        RequestBuilder::head(self, path)
    }

    /// `DELETE path`.
    pub fn delete<Resp>(&self, path: &str) -> RequestBuilder<'_, (), Resp, C> {
        RequestBuilder::delete(self, path)
    }

    /// `POST path` with `payload`.
    pub fn post<Req, Resp>(&self, path: &str, payload: Req) -> RequestBuilder<'_, Req, Resp, C> {
        RequestBuilder::post(self, path, payload)
    }

    /// `PUT path` with `payload`.
    pub fn put<Req, Resp>(&self, path: &str, payload: Req) -> RequestBuilder<'_, Req, Resp, C> {
        RequestBuilder::put(self, path, payload)
    }

    /// `PATCH path` with `payload`.
    pub fn patch<Req, Resp>(&self, path: &str, payload: Req) -> RequestBuilder<'_, Req, Resp, C> {
        RequestBuilder::patch(self, path, payload)
    }

    /// Any method, with an optional payload.
    pub fn request<Req, Resp>(
        &self,
        method: Method,
        path: &str,
        payload: Option<Req>,
    ) -> RequestBuilder<'_, Req, Resp, C> {
        RequestBuilder::method(self, method, path, payload)
    }
}
