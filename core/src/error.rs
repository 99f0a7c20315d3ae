//! Error types for the Pinboard API client.
//!
//! # Design
//! Failures are classified by where they happen: before the network
//! (`Validation`, `MalformedRequest`), on the wire (`Transport`), in the
//! status line (`RateLimited`, `Unauthorized`, `HttpStatus`), or while turning
//! the body into domain records (`Decode`, `MalformedField`, `Rejected`).
//! Status-derived errors win over whatever XML the body carries.

use thiserror::Error;

/// Error produced by a `Transport` implementation, propagated untouched.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `PinboardClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-supplied parameters broke an endpoint constraint. No request
    /// was sent.
    #[error("{0}")]
    Validation(String),

    /// The endpoint path or base URL could not form a request URL.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// DNS, connection or TLS failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The server answered 429.
    #[error("{0}")]
    RateLimited(String),

    /// The server answered 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The body was not XML of the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] quick_xml::DeError),

    /// A decoded attribute could not be converted to its semantic type.
    #[error("malformed field `{field}` ({value:?}): {reason}")]
    MalformedField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The server accepted the request but reported a result code other
    /// than `done`.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    pub(crate) fn malformed_field(
        field: &'static str,
        value: &str,
        reason: impl ToString,
    ) -> Self {
        ApiError::MalformedField {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
