//! Single-attempt streaming upstream client

use http::{HeaderMap, Method};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Forwarding failures, surfaced to the client as 502/504
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The bounded request timeout elapsed
    #[error("upstream request timed out: {0}")]
    Timeout(String),

    /// Connection, TLS or protocol failure talking to the upstream
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

/// Streaming HTTP client for the proxy hop.
///
/// One instance is shared across all requests; reqwest pools connections
/// per upstream host internally. Redirects are disabled so 3xx responses
/// relay verbatim, and the timeout bounds the whole exchange.
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Execute the upstream call. One attempt, no retries.
    ///
    /// `headers` must already be rewritten (see
    /// [`crate::headers::outbound_headers`]). The body is streamed as
    /// given, except that `GET`/`HEAD` never send one.
    pub async fn forward(
        &self,
        method: Method,
        target: Url,
        headers: HeaderMap,
        body: Option<reqwest::Body>,
    ) -> Result<reqwest::Response, ForwardError> {
        debug!(method = %method, target = %target, "forwarding upstream");

        let mut request = self.client.request(method.clone(), target).headers(headers);
        if method != Method::GET && method != Method::HEAD {
            if let Some(body) = body {
                request = request.body(body);
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ForwardError::Timeout(e.to_string())
            } else {
                ForwardError::Upstream(e.to_string())
            }
        })?;

        debug!(status = %response.status(), "upstream responded");
        Ok(response)
    }
}
