//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::client::PinboardClient;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::Credential;
use crate::transport::Transport;

/// Body the API sends alongside error statuses.
pub const ERROR_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><result code="something went wrong" />"#;

/// Records every request and replays scripted replies in order. With no
/// reply queued it answers `200` with an empty `<result>`.
#[derive(Debug, Default)]
pub struct SpyTransport {
    sent: RefCell<Vec<HttpRequest>>,
    replies: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl SpyTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: &str) {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body.as_bytes())));
    }

    pub fn fail(&self, message: &str) {
        self.replies.borrow_mut().push_back(Err(message.into()));
    }

    pub fn calls(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn last_url(&self) -> String {
        self.sent
            .borrow()
            .last()
            .map(|req| req.url.clone())
            .unwrap_or_default()
    }
}

impl Transport for SpyTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, "<result/>")))
    }
}

/// Fresh client authenticated as `user:token` against the default base URL.
pub fn client(spy: &SpyTransport) -> PinboardClient<&SpyTransport> {
    let config = ClientConfig::new(Credential::new("user", "token"));
    PinboardClient::with_transport(config, spy).unwrap()
}
