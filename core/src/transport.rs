//! Blocking transport that executes one `HttpRequest`.
//!
//! # Design
//! The client never touches sockets itself. `Transport` is the seam: it
//! performs exactly one GET and hands back status, headers and body, or the
//! transport's own error. Status interpretation stays in the client, which
//! is why `UreqTransport` turns off ureq's status-as-error behavior.

use std::fmt;

use tracing::trace;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes a single HTTP GET.
///
/// Implementations must not retry. Non-2xx statuses are returned as data,
/// not as errors.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// `Transport` backed by a shared `ureq::Agent`.
///
/// The agent pools connections and is safe to share across threads, so one
/// `UreqTransport` can serve concurrent callers.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an agent configured by the caller (proxies, TLS, timeouts).
    ///
    /// The agent must be built with `http_status_as_error(false)` or 401/429
    /// responses will surface as transport errors.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.get(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // ureq caps reads at 10 MiB by default; a full `posts/all` can exceed that.
        let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;
        trace!(endpoint = %request.endpoint, status, bytes = body.len(), "response read");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
