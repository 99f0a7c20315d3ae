//! Request builder: endpoint path + parameters + credential → absolute URL.
//!
//! # Design
//! Parameters live in a `BTreeMap`, so the encoded query string is sorted by
//! name and identical inputs always produce byte-identical URLs. Values are
//! encoded with `application/x-www-form-urlencoded` rules via `url`'s
//! serializer (space → `+`, `:` → `%3A`, `/` → `%2F`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{ApiError, Result};

/// Query parameter carrying the credential on every request.
pub const AUTH_TOKEN_PARAM: &str = "auth_token";

/// Username plus API token. Serializes as `username:token`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    token: String,
}

impl Credential {
    pub fn new(username: &str, token: &str) -> Self {
        Self {
            username: username.to_string(),
            token: token.to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.username, self.token)
    }
}

// Keeps the token out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Parses the `username:token` form shown on the Pinboard settings page.
impl FromStr for Credential {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((username, token)) if !username.is_empty() && !token.is_empty() => {
                Ok(Self::new(username, token))
            }
            _ => Err(ApiError::MalformedRequest(
                "credential must look like username:token".to_string(),
            )),
        }
    }
}

/// Query parameters for one endpoint call. Each name maps to one or more
/// values; every value is serialized as its own `name=value` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, Vec<String>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `name`, keeping earlier values.
    pub fn add(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.0.entry(name.to_string()).or_default().push(value.into());
        self
    }

    /// Append every value in `values` under `name`. An empty iterator adds
    /// nothing, not even the name.
    pub fn add_all<I, S>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.add(name, value);
        }
        self
    }

    /// Replace every value under `name` with `value`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.0.insert(name.to_string(), vec![value.into()]);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }
}

/// Resolve `endpoint` against `base` and attach the encoded query string.
///
/// When a credential is supplied it becomes the only `auth_token` pair,
/// replacing any the caller passed.
pub fn build_url(
    base: &Url,
    endpoint: &str,
    params: Option<Params>,
    credential: Option<&Credential>,
) -> Result<Url> {
    if endpoint.is_empty() {
        return Err(ApiError::MalformedRequest("empty endpoint path".to_string()));
    }
    if endpoint.starts_with('/') {
        return Err(ApiError::MalformedRequest(format!(
            "endpoint {endpoint:?} must be relative"
        )));
    }
    if endpoint.contains(['?', '#']) {
        return Err(ApiError::MalformedRequest(format!(
            "endpoint {endpoint:?} must not carry a query or fragment"
        )));
    }

    let mut url = base
        .join(endpoint)
        .map_err(|e| ApiError::MalformedRequest(format!("endpoint {endpoint:?}: {e}")))?;
    if !url.as_str().starts_with(base.as_str()) || url.as_str().len() == base.as_str().len() {
        return Err(ApiError::MalformedRequest(format!(
            "endpoint {endpoint:?} resolves outside {base}"
        )));
    }

    let mut params = params.unwrap_or_default();
    if let Some(credential) = credential {
        params.set(AUTH_TOKEN_PARAM, credential.to_string());
    }

    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params.iter());
    }
    Ok(url)
}
