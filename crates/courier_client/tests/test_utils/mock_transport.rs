//! Scripted transport standing in for the network.

use async_trait::async_trait;
use courier_client::{HttpRequest, HttpTransport};
use courier_core::ApiResponse;
use courier_error::{CourierResult, TransportError, TransportErrorKind};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

/// What the transport does for one attempt.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return this response
    Respond(ApiResponse),
    /// Fail below the application layer
    Fail(TransportErrorKind),
    /// Never complete
    Hang,
}

impl MockBehavior {
    /// Respond with a status and body.
    pub fn status(status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        Self::Respond(ApiResponse::new(status, body.to_string()))
    }
}

/// Plays a script of behaviors, then repeats a fallback.
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockBehavior>>,
    fallback: MockBehavior,
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
}

#[allow(dead_code)]
impl MockTransport {
    /// Always behave the same way.
    pub fn always(behavior: MockBehavior) -> Self {
        Self::scripted(Vec::new(), behavior)
    }

    /// Play `script` in order, then `fallback` forever.
    pub fn scripted(script: Vec<MockBehavior>, fallback: MockBehavior) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of attempts received.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// When each attempt arrived.
    pub fn call_times(&self) -> Vec<Instant> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(at, _)| *at)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> CourierResult<ApiResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((Instant::now(), request));
        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match behavior {
            MockBehavior::Respond(response) => Ok(response),
            MockBehavior::Fail(kind) => Err(TransportError::new(kind, "scripted failure").into()),
            MockBehavior::Hang => futures::future::pending().await,
        }
    }
}
