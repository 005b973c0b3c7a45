//! The request execution pipeline.

use crate::{CallDescriptor, Client, HttpRequest, RequestOption};
use courier_core::{ApiResponse, Codec};
use courier_error::{
    CancelledError, CourierErrorKind, CourierResult, HookError, HookStage, RequestBuildError,
    RequestBuildErrorKind, SuspendPoint,
};
use courier_resilience::Backoff;
use futures::FutureExt;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// A token that cancels itself once `timeout` has elapsed.
///
/// Must be called from within a Tokio runtime.
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use courier_client::deadline;
/// use std::time::Duration;
///
/// let token = deadline(Duration::from_millis(10));
/// token.cancelled().await;
/// assert!(token.is_cancelled());
/// # }
/// ```
pub fn deadline(timeout: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    let timer = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = timer.cancelled() => {}
            _ = tokio::time::sleep(timeout) => timer.cancel(),
        }
    });
    token
}

impl<C: Codec> Client<C> {
    /// Run one logical call.
    ///
    /// Waits for admission, builds the request, performs transport attempts
    /// through the breaker (retrying per the client's policy), then sniffs,
    /// decodes and runs post-response hooks. The payload is `Some` exactly
    /// when the descriptor asked for decoding.
    ///
    /// # Errors
    ///
    /// - [`CancelledError`] if `cancel` fires during admission, an attempt or
    ///   a backoff sleep
    /// - [`RequestBuildError`] or an option error while building the request
    /// - the final attempt's transport error or breaker rejection
    /// - the sniffer's service error, a decode error, or a hook error
    #[instrument(
        skip_all,
        fields(method = %descriptor.method, path = %descriptor.path)
    )]
    pub async fn execute<Req, Resp>(
        &self,
        descriptor: CallDescriptor<Req, Resp>,
        cancel: &CancellationToken,
    ) -> CourierResult<(ApiResponse, Option<Resp>)>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let config = self.config();
        config.limiter().wait(cancel).await?;
        debug!("Admitted");

        let CallDescriptor {
            method,
            path,
            payload,
            decode,
            options,
            sniffer,
            hooks,
        } = descriptor;

        let request = self.build_request(method, &path, payload.as_ref(), &options)?;
        drop(options);
        let response = self.send(request, cancel).await?;

        let snapshot = config
            .rate_limit_parser()
            .as_ref()
            .and_then(|parser| parser.parse(&response));
        if let Some(snapshot) = snapshot {
            config.limiter().adapt(&snapshot, *config.rate_limit_window());
        }

        if let Some(sniffer) = &sniffer {
            sniffer(&response).map_err(|e| {
                if matches!(e.kind(), CourierErrorKind::Service(_)) {
                    e
                } else {
                    HookError::caused_by(HookStage::ErrorSniff, e).into()
                }
            })?;
        }

        let mut payload = if decode {
            Some(config.codec().decode::<Resp>(response.body())?)
        } else {
            None
        };

        for hook in &hooks {
            hook(&response, payload.as_mut())
                .map_err(|e| HookError::caused_by(HookStage::AfterResponse, e))?;
        }

        Ok((response, payload))
    }

    fn resolve_url(&self, path: &str) -> CourierResult<Url> {
        let resolved = match self.config().base_url() {
            Some(base) => base.join(path.trim_start_matches('/')),
            None => Url::parse(path),
        };
        resolved.map_err(|e| {
            RequestBuildError::new(RequestBuildErrorKind::InvalidUrl(format!("{}: {}", path, e)))
                .into()
        })
    }

    fn build_request<Req: Serialize>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Req>,
        options: &[Box<dyn RequestOption>],
    ) -> CourierResult<HttpRequest> {
        let config = self.config();
        let mut request = HttpRequest::new(method, self.resolve_url(path)?);

        *request.headers_mut() = config.headers().clone();

        let sends_body = !matches!(*request.method(), Method::GET | Method::HEAD);
        match payload {
            Some(payload) if sends_body => {
                let body = config.codec().encode(payload)?;
                let content_type = request
                    .headers()
                    .get(CONTENT_TYPE)
                    .cloned()
                    .unwrap_or_else(|| HeaderValue::from_static(config.codec().content_type()));
                request.set_body(body, content_type);
            }
            Some(_) => debug!(
                method = %request.method(),
                "Payload ignored for method without body"
            ),
            None => {}
        }

        for option in options {
            option.apply(&mut request)?;
        }
        Ok(request)
    }

    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> CourierResult<ApiResponse> {
        let config = self.config();
        let Some(policy) = config.retry() else {
            return self.attempt(request, cancel).await;
        };

        let per_call;
        let controller = match config.shared_retry() {
            Some(shared) => shared,
            None => {
                per_call = policy.controller();
                &per_call
            }
        };

        let outcome = loop {
            let outcome = self.attempt(request.clone(), cancel).await;
            let cancelled = outcome.as_ref().is_err_and(|e| e.is_cancelled());
            if cancelled || !policy.should_retry(&outcome) {
                break outcome;
            }

            let delay = match controller.next() {
                Backoff::Stop => {
                    warn!(
                        attempts = controller.attempt_count(),
                        "Retry attempts exhausted"
                    );
                    break outcome;
                }
                Backoff::Wait(delay) => delay,
            };
            match &outcome {
                Ok(response) => {
                    warn!(status = %response.status(), ?delay, "Retrying after response")
                }
                Err(e) => warn!(error = %e, ?delay, "Retrying after error"),
            }
            drop(outcome);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    break Err(CancelledError::new(SuspendPoint::Backoff).into());
                }
                _ = tokio::time::sleep(delay) => {}
            }
        };

        controller.reset();
        outcome
    }

    async fn attempt(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> CourierResult<ApiResponse> {
        let config = self.config();
        let transport = Arc::clone(config.transport());
        let call = async move { transport.send(request).await }.boxed();
        debug!("Issuing attempt");

        let outcome: CourierResult<ApiResponse> = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CancelledError::new(SuspendPoint::Transport).into()),
            outcome = config.breaker().execute(call) => outcome,
        };

        if let (true, Ok(response)) = (*config.debug(), &outcome) {
            info!(target: "courier::dump", "RESPONSE:\n{}", response.dump());
        }
        outcome
    }
}
