//! Synchronous client for the Pinboard v1 bookmarking API.
//!
//! # Overview
//! Turns typed calls into authenticated GET requests, runs them through a
//! `Transport`, classifies the status, and decodes the attribute-style XML
//! the API answers with into typed records.
//!
//! # Design
//! - `PinboardClient` holds only read-only configuration and a transport.
//! - Each endpoint is split into `build_*` (produces `HttpRequest`) and
//!   `parse_*` (consumes `HttpResponse`), with a one-call method that runs
//!   both through the transport. Hosts may do the I/O themselves.
//! - Raw XML records never leave `translate`; callers only see the renamed,
//!   typed records in `types`.
//! - No retries. Every error reaches the caller as soon as it happens.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod posts;
pub mod request;
pub mod tags;
pub mod translate;
pub mod transport;
pub mod types;
pub mod user;

#[cfg(test)]
mod testing;

pub use client::{check_status, status_text, PinboardClient};
pub use config::{ClientConfig, DEFAULT_BASE_URL, USER_AGENT};
pub use error::{ApiError, Result, TransportError};
pub use http::{HttpRequest, HttpResponse};
pub use request::{build_url, Credential, Params};
pub use transport::{Transport, UreqTransport};
pub use types::{AllPostsQuery, NewPost, Post, PostDate, Suggestions, Tag};
