//! Client configuration.
//!
//! Read-only once a client is built; clones are cheap enough to hand one to
//! each client instance.

use crate::request::Credential;

/// Production API root. Endpoint paths are resolved relative to it, so it
/// must end in `/`.
pub const DEFAULT_BASE_URL: &str = "https://api.pinboard.in/v1/";

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("pinboard-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub credential: Option<Credential>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            credential: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration authenticating as `credential`.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            ..Self::default()
        }
    }

    /// Point the client at another API root. A missing trailing slash is
    /// added so relative endpoints resolve beneath it.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.base_url = base;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}
