//! `posts/*` endpoints.

use chrono::{DateTime, Utc};

use crate::client::{check_status, PinboardClient};
use crate::decode::{decode_result_code, decode_xml};
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::request::Params;
use crate::translate::{
    format_time, parse_time, translate_all, RawDates, RawPosts, RawSuggestions, RawUpdate,
};
use crate::transport::Transport;
use crate::types::{AllPostsQuery, NewPost, Post, PostDate, Suggestions};

/// Filtering endpoints accept at most this many tags.
pub const MAX_FILTER_TAGS: usize = 3;

/// Upper bound for `posts/recent`.
pub const MAX_RECENT_COUNT: i32 = 100;

/// Sent to `posts/recent` when the caller passes a negative count.
pub const DEFAULT_RECENT_COUNT: i32 = 15;

fn check_filter_tags<S: AsRef<str>>(tags: &[S]) -> Result<()> {
    if tags.len() > MAX_FILTER_TAGS {
        return Err(ApiError::Validation(format!(
            "too many tags (max is {MAX_FILTER_TAGS})"
        )));
    }
    Ok(())
}

/// Filter tags travel as one space-separated value.
fn add_joined_tags<S: AsRef<str>>(params: &mut Params, name: &str, tags: &[S]) {
    if !tags.is_empty() {
        let joined = tags.iter().map(|t| t.as_ref()).collect::<Vec<&str>>().join(" ");
        params.add(name, joined);
    }
}

fn parse_posts(response: &HttpResponse) -> Result<Vec<Post>> {
    check_status(response)?;
    let raw: RawPosts = decode_xml(&response.body)?;
    translate_all(raw.posts)
}

impl<T> PinboardClient<T> {
    pub fn build_add_post(&self, post: &NewPost) -> Result<HttpRequest> {
        let mut params = Params::new();
        params
            .add("url", &post.url)
            .add("description", &post.title)
            .add("extended", &post.description)
            .add_all("tags", &post.tags)
            .add("replace", post.replace.to_string())
            .add("shared", post.shared.to_string())
            .add("toread", post.to_read.to_string());
        if let Some(time) = &post.time {
            params.add("dt", format_time(time));
        }
        self.build_request("posts/add", Some(params))
    }

    pub fn parse_add_post(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)?;
        decode_result_code(&response.body)
    }

    pub fn build_delete_post(&self, url: &str) -> Result<HttpRequest> {
        let mut params = Params::new();
        params.add("url", url);
        self.build_request("posts/delete", Some(params))
    }

    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)?;
        decode_result_code(&response.body)
    }

    /// Posts from a single day, optionally narrowed by tag or URL. With
    /// neither `date` nor `url` the server picks the most recent day.
    pub fn build_get_posts(
        &self,
        tags: &[&str],
        date: Option<DateTime<Utc>>,
        url: Option<&str>,
    ) -> Result<HttpRequest> {
        check_filter_tags(tags)?;
        let mut params = Params::new();
        add_joined_tags(&mut params, "tags", tags);
        if let Some(date) = date {
            params.add("dt", format_time(&date));
        }
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            params.add("url", url);
        }
        self.build_request("posts/get", Some(params))
    }

    pub fn parse_get_posts(&self, response: HttpResponse) -> Result<Vec<Post>> {
        parse_posts(&response)
    }

    /// Most recent posts. `count` above 100 is refused; a negative count
    /// asks for the server default of 15.
    pub fn build_recent_posts(&self, tags: &[&str], count: i32) -> Result<HttpRequest> {
        check_filter_tags(tags)?;
        if count > MAX_RECENT_COUNT {
            return Err(ApiError::Validation(format!(
                "count must be below {MAX_RECENT_COUNT}"
            )));
        }
        let count = if count < 0 { DEFAULT_RECENT_COUNT } else { count };

        let mut params = Params::new();
        params.add_all("tag", tags.iter().copied()).add("count", count.to_string());
        self.build_request("posts/recent", Some(params))
    }

    pub fn parse_recent_posts(&self, response: HttpResponse) -> Result<Vec<Post>> {
        parse_posts(&response)
    }

    pub fn build_all_posts(&self, query: &AllPostsQuery) -> Result<HttpRequest> {
        check_filter_tags(query.tags.as_slice())?;
        let mut params = Params::new();
        add_joined_tags(&mut params, "tags", query.tags.as_slice());
        if let Some(start) = query.start {
            params.add("start", start.to_string());
        }
        if let Some(results) = query.results {
            params.add("results", results.to_string());
        }
        if let Some(from) = &query.from {
            params.add("fromdt", format_time(from));
        }
        if let Some(to) = &query.to {
            params.add("todt", format_time(to));
        }
        self.build_request("posts/all", Some(params))
    }

    pub fn parse_all_posts(&self, response: HttpResponse) -> Result<Vec<Post>> {
        parse_posts(&response)
    }

    pub fn build_last_update(&self) -> Result<HttpRequest> {
        self.build_request("posts/update", None)
    }

    pub fn parse_last_update(&self, response: HttpResponse) -> Result<DateTime<Utc>> {
        check_status(&response)?;
        let raw: RawUpdate = decode_xml(&response.body)?;
        parse_time("time", &raw.time)
    }

    pub fn build_post_dates(&self, tags: &[&str]) -> Result<HttpRequest> {
        check_filter_tags(tags)?;
        let mut params = Params::new();
        add_joined_tags(&mut params, "tags", tags);
        self.build_request("posts/dates", Some(params))
    }

    pub fn parse_post_dates(&self, response: HttpResponse) -> Result<Vec<PostDate>> {
        check_status(&response)?;
        let raw: RawDates = decode_xml(&response.body)?;
        translate_all(raw.dates)
    }

    pub fn build_suggest_tags(&self, url: &str) -> Result<HttpRequest> {
        let mut params = Params::new();
        params.add("url", url);
        self.build_request("posts/suggest", Some(params))
    }

    pub fn parse_suggest_tags(&self, response: HttpResponse) -> Result<Suggestions> {
        check_status(&response)?;
        let raw: RawSuggestions = decode_xml(&response.body)?;
        Ok(raw.into())
    }
}

impl<T: Transport> PinboardClient<T> {
    /// Save a bookmark. Tags are not limited in number here.
    pub fn add_post(&self, post: &NewPost) -> Result<()> {
        let request = self.build_add_post(post)?;
        self.parse_add_post(self.execute(&request)?)
    }

    pub fn delete_post(&self, url: &str) -> Result<()> {
        let request = self.build_delete_post(url)?;
        self.parse_delete_post(self.execute(&request)?)
    }

    pub fn get_posts(
        &self,
        tags: &[&str],
        date: Option<DateTime<Utc>>,
        url: Option<&str>,
    ) -> Result<Vec<Post>> {
        let request = self.build_get_posts(tags, date, url)?;
        self.parse_get_posts(self.execute(&request)?)
    }

    pub fn recent_posts(&self, tags: &[&str], count: i32) -> Result<Vec<Post>> {
        let request = self.build_recent_posts(tags, count)?;
        self.parse_recent_posts(self.execute(&request)?)
    }

    pub fn all_posts(&self, query: &AllPostsQuery) -> Result<Vec<Post>> {
        let request = self.build_all_posts(query)?;
        self.parse_all_posts(self.execute(&request)?)
    }

    /// Time of the most recent change to any bookmark. Cheap to poll before
    /// deciding whether to call `all_posts`.
    pub fn last_update(&self) -> Result<DateTime<Utc>> {
        let request = self.build_last_update()?;
        self.parse_last_update(self.execute(&request)?)
    }

    pub fn post_dates(&self, tags: &[&str]) -> Result<Vec<PostDate>> {
        let request = self.build_post_dates(tags)?;
        self.parse_post_dates(self.execute(&request)?)
    }

    pub fn suggest_tags(&self, url: &str) -> Result<Suggestions> {
        let request = self.build_suggest_tags(url)?;
        self.parse_suggest_tags(self.execute(&request)?)
    }
}
