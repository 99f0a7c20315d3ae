//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The client builds `HttpRequest`
//! values and parses `HttpResponse` values; executing the round-trip belongs
//! to a `Transport` (see `transport.rs`) or to the host directly.
//!
//! Every Pinboard call is a GET with all parameters in the query string, so
//! there is no method or body on the request side.

/// An HTTP GET described as plain data.
///
/// `endpoint` is the relative API path (`posts/get`). It is safe to log;
/// `url` carries the `auth_token` query parameter and is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub endpoint: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// The body stays as bytes so callers asking for the raw payload get it
/// verbatim.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Convenience constructor for a response with no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
