//! `tags/*` endpoints.

use crate::client::{check_status, PinboardClient};
use crate::decode::{decode_result_code, decode_xml};
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::Params;
use crate::translate::{translate_all, RawTags};
use crate::transport::Transport;
use crate::types::Tag;

impl<T> PinboardClient<T> {
    pub fn build_tags(&self) -> Result<HttpRequest> {
        self.build_request("tags/get", None)
    }

    pub fn parse_tags(&self, response: HttpResponse) -> Result<Vec<Tag>> {
        check_status(&response)?;
        let raw: RawTags = decode_xml(&response.body)?;
        translate_all(raw.tags)
    }

    pub fn build_delete_tag(&self, tag: &str) -> Result<HttpRequest> {
        let mut params = Params::new();
        params.add("tag", tag);
        self.build_request("tags/delete", Some(params))
    }

    pub fn parse_delete_tag(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)?;
        decode_result_code(&response.body)
    }

    pub fn build_rename_tag(&self, old: &str, new: &str) -> Result<HttpRequest> {
        let mut params = Params::new();
        params.add("old", old).add("new", new);
        self.build_request("tags/rename", Some(params))
    }

    pub fn parse_rename_tag(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)?;
        decode_result_code(&response.body)
    }
}

impl<T: Transport> PinboardClient<T> {
    /// Every tag the user has, with usage counts.
    pub fn tags(&self) -> Result<Vec<Tag>> {
        let request = self.build_tags()?;
        self.parse_tags(self.execute(&request)?)
    }

    /// Remove `tag` from every post.
    pub fn delete_tag(&self, tag: &str) -> Result<()> {
        let request = self.build_delete_tag(tag)?;
        self.parse_delete_tag(self.execute(&request)?)
    }

    /// Rename `old` to `new`, merging into `new` if it already exists.
    pub fn rename_tag(&self, old: &str, new: &str) -> Result<()> {
        let request = self.build_rename_tag(old, new)?;
        self.parse_rename_tag(self.execute(&request)?)
    }
}
