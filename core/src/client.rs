//! Pinboard API client: request building, dispatch and status handling.
//!
//! # Design
//! `PinboardClient` holds read-only configuration plus a `Transport`. Every
//! endpoint is split the same way: a `build_*` method that produces an
//! `HttpRequest`, a `parse_*` method that consumes an `HttpResponse`, and a
//! one-call method that runs both around `Transport::send`. Hosts that do
//! their own I/O can use the first two and never touch the transport.
//!
//! The endpoint methods live next to their domain in `posts.rs`, `tags.rs`
//! and `user.rs`; this file carries the shared machinery.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::decode::decode_xml;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::request::{build_url, Credential, Params};
use crate::transport::{Transport, UreqTransport};

/// Synchronous client for the Pinboard v1 API.
///
/// Holds no mutable state, so one instance can be shared by concurrent
/// callers whenever its transport allows it.
#[derive(Debug, Clone)]
pub struct PinboardClient<T = UreqTransport> {
    base_url: Url,
    credential: Option<Credential>,
    user_agent: String,
    transport: T,
}

impl PinboardClient<UreqTransport> {
    /// Client over a fresh `ureq` agent.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T> PinboardClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::MalformedRequest(format!("base URL {:?}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::MalformedRequest(format!(
                "base URL {:?} cannot resolve relative paths",
                config.base_url
            )));
        }
        Ok(Self {
            base_url,
            credential: config.credential,
            user_agent: config.user_agent,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build an authenticated GET for `endpoint`. Nothing is sent.
    pub fn build_request(&self, endpoint: &str, params: Option<Params>) -> Result<HttpRequest> {
        let url = build_url(&self.base_url, endpoint, params, self.credential.as_ref())?;
        Ok(HttpRequest {
            endpoint: endpoint.to_string(),
            url: url.into(),
            headers: vec![("user-agent".to_string(), self.user_agent.clone())],
        })
    }
}

impl<T: Transport> PinboardClient<T> {
    /// Send `request` once. Transport failures come back as
    /// `ApiError::Transport`; the status is not inspected here.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(endpoint = %request.endpoint, "sending request");
        let response = self.transport.send(request).map_err(|e| {
            warn!(endpoint = %request.endpoint, error = %e, "transport failure");
            ApiError::Transport(e)
        })?;
        debug!(
            endpoint = %request.endpoint,
            status = response.status,
            bytes = response.body.len(),
            "response received"
        );
        Ok(response)
    }

    /// Call `endpoint` and decode the XML body into `D`.
    pub fn fetch<D: DeserializeOwned>(&self, endpoint: &str, params: Option<Params>) -> Result<D> {
        let request = self.build_request(endpoint, params)?;
        let response = self.execute(&request)?;
        check_status(&response)?;
        decode_xml(&response.body)
    }

    /// Call `endpoint` and return the body bytes without parsing them.
    pub fn fetch_raw(&self, endpoint: &str, params: Option<Params>) -> Result<Vec<u8>> {
        let request = self.build_request(endpoint, params)?;
        let response = self.execute(&request)?;
        check_status(&response)?;
        Ok(response.body)
    }
}

/// Classify the status line. 401 and 429 get their own variants carrying
/// the canonical reason phrase, whatever the body says.
pub fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let err = match response.status {
        401 => ApiError::Unauthorized(status_text(401)),
        429 => ApiError::RateLimited(status_text(429)),
        status => ApiError::HttpStatus {
            status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        },
    };
    warn!(status = response.status, error = %err, "request failed");
    Err(err)
}

/// Canonical reason phrase for `status`, e.g. `Too Many Requests`.
pub fn status_text(status: u16) -> String {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status")
        .to_string()
}
