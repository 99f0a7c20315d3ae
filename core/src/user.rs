//! `user/*` endpoints. Both answer a bare `<result>` whose text is the value.

use crate::client::{check_status, PinboardClient};
use crate::decode::decode_text;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

impl<T> PinboardClient<T> {
    pub fn build_secret_rss_key(&self) -> Result<HttpRequest> {
        self.build_request("user/secret", None)
    }

    pub fn parse_secret_rss_key(&self, response: HttpResponse) -> Result<String> {
        check_status(&response)?;
        decode_text(&response.body)
    }

    pub fn build_api_token(&self) -> Result<HttpRequest> {
        self.build_request("user/api_token", None)
    }

    pub fn parse_api_token(&self, response: HttpResponse) -> Result<String> {
        check_status(&response)?;
        decode_text(&response.body)
    }
}

impl<T: Transport> PinboardClient<T> {
    /// Key for the user's private RSS feeds.
    pub fn secret_rss_key(&self) -> Result<String> {
        let request = self.build_secret_rss_key()?;
        self.parse_secret_rss_key(self.execute(&request)?)
    }

    /// The token half of the user's API credential.
    pub fn api_token(&self) -> Result<String> {
        let request = self.build_api_token()?;
        self.parse_api_token(self.execute(&request)?)
    }
}
