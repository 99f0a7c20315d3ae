//! Domain records returned to callers, and request inputs.
//!
//! # Design
//! These are the renamed, typed views of what the API sends. Field names
//! follow their meaning, not the wire: the API's `description` attribute is
//! a post's title and `extended` is its description. Records derive serde so
//! test vectors can state expected results as JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub description: String,
    pub hash: String,
    pub url: String,
    pub tags: Vec<String>,
    pub to_read: bool,
    pub time: Option<DateTime<Utc>>,
}

/// A tag and the number of posts using it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub count: u32,
}

/// Number of posts saved on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDate {
    pub date: NaiveDate,
    pub count: u32,
}

/// Tag suggestions for a URL: `popular` across all users, `recommended`
/// from the caller's own tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestions {
    pub popular: Vec<String>,
    pub recommended: Vec<String>,
}

/// Input for `posts/add`. `url` and `title` are required by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Creation time. Defaults to "now" on the server when absent.
    pub time: Option<DateTime<Utc>>,
    /// Overwrite an existing bookmark for the same URL.
    pub replace: bool,
    pub shared: bool,
    pub to_read: bool,
}

impl NewPost {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            description: String::new(),
            tags: Vec::new(),
            time: None,
            replace: true,
            shared: true,
            to_read: false,
        }
    }
}

/// Filters for `posts/all`. Unset fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllPostsQuery {
    /// Up to three tags; a post must carry all of them.
    pub tags: Vec<String>,
    /// Offset into the result set.
    pub start: Option<u32>,
    /// Maximum number of posts to return.
    pub results: Option<u32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
