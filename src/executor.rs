//! The retry loop around a single outbound HTTP call.

use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method, Response, Url,
};
use tokio::time::sleep;

use crate::{
    policy::{compute_backoff, should_retry},
    RetryPolicy, Transport, TransportError,
};

/// Diagnostic header carrying the retry number on every attempt after the first.
pub const RETRY_ATTEMPT_HEADER: &str = "x-retry-attempt";

/// Everything needed to rebuild the same request for every attempt.
///
/// A sent body is consumed, so the executor never resends one; it derives
/// a fresh [`reqwest::Request`] from the template instead.
#[derive(Clone, Debug)]
pub struct RequestTemplate {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl RequestTemplate {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// A `POST` carrying an already serialized JSON body.
    pub fn post_json(url: Url, body: Vec<u8>) -> Self {
        Self::new(Method::POST, url)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(body)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Timeout applied to each attempt separately.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub(crate) fn build(&self, attempt: u32) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        if attempt > 0 {
            request.headers_mut().insert(
                HeaderName::from_static(RETRY_ATTEMPT_HEADER),
                HeaderValue::from(attempt),
            );
        }
        if let Some(body) = &self.body {
            *request.body_mut() = Some(body.clone().into());
        }
        *request.timeout_mut() = self.timeout;
        request
    }
}

/// Drives a [`Transport`] under a [`RetryPolicy`].
///
/// The executor holds no per-call state, so one instance can serve any
/// number of concurrent calls.
#[derive(Clone, Debug)]
pub struct Executor<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Sends the request, retrying transient failures.
    ///
    /// Returns the first response with a status below 500 other than 429,
    /// untouched. When a failure is not retryable or no retries are left,
    /// the last response (body unread) or transport error is returned as
    /// is. Bodies of responses that get retried are drained before the
    /// next attempt. The response that comes back belongs to the caller.
    ///
    /// There is no ceiling on the total time spent here. A per-attempt
    /// timeout surfaces as a retryable deadline error, so callers that need
    /// an overall bound must wrap this future themselves.
    pub async fn execute(&self, template: &RequestTemplate) -> Result<Response, TransportError> {
        let mut attempt = 0u32;
        loop {
            let outcome = self.transport.send(template.build(attempt)).await;

            let status = match &outcome {
                Ok(response) => response.status().as_u16(),
                Err(_) => 0,
            };
            if outcome.is_ok() && status < 500 && status != 429 {
                return outcome;
            }

            let retryable = should_retry(status, outcome.as_ref().err());
            if !retryable || attempt >= self.policy.max_retries {
                #[cfg(feature = "tracing")]
                {
                    if retryable {
                        tracing::warn!(
                            url = %template.url(),
                            attempts = attempt + 1,
                            status,
                            "giving up after exhausting retries"
                        );
                    }
                }
                return outcome;
            }

            let delay = compute_backoff(&self.policy, attempt);

            #[cfg(feature = "tracing")]
            {
                match &outcome {
                    Ok(_) => tracing::debug!(
                        url = %template.url(),
                        attempt,
                        status,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after retryable status"
                    ),
                    Err(err) => tracing::debug!(
                        url = %template.url(),
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transport error"
                    ),
                }
            }

            if let Ok(response) = outcome {
                // Reading to the end hands the connection back to the pool.
                if let Err(_err) = response.bytes().await {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        url = %template.url(),
                        attempt,
                        error = %_err,
                        "failed to drain retried response body"
                    );
                }
            }

            sleep(delay).await;
            attempt += 1;
        }
    }
}
