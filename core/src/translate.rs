//! Raw response records and the translators that turn them into domain
//! records.
//!
//! # Design
//! Raw records mirror the wire verbatim: attribute names as sent, every value
//! a string, absent attributes defaulting to empty. All conversion (string
//! flags to `bool`, dates, counts, tag splitting) happens here and nowhere
//! else. Batches translate all-or-nothing: one bad item fails the call.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::types::{Post, PostDate, Suggestions, Tag};

/// Timestamp layout used on the wire, e.g. `2011-03-24T19:02:07Z`.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Calendar date layout used by `posts/dates`, e.g. `2010-11-24`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPost {
    #[serde(rename = "@description", default)]
    pub description: String,
    #[serde(rename = "@extended", default)]
    pub extended: String,
    #[serde(rename = "@hash", default)]
    pub hash: String,
    #[serde(rename = "@href", default)]
    pub href: String,
    #[serde(rename = "@tag", default)]
    pub tag: String,
    #[serde(rename = "@toread", default)]
    pub toread: String,
    #[serde(rename = "@time", default)]
    pub time: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPosts {
    #[serde(rename = "post", default)]
    pub posts: Vec<RawPost>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTag {
    #[serde(rename = "@tag", default)]
    pub tag: String,
    #[serde(rename = "@count", default)]
    pub count: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTags {
    #[serde(rename = "tag", default)]
    pub tags: Vec<RawTag>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDate {
    #[serde(rename = "@date", default)]
    pub date: String,
    #[serde(rename = "@count", default)]
    pub count: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDates {
    #[serde(rename = "date", default)]
    pub dates: Vec<RawDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawUpdate {
    #[serde(rename = "@time", default)]
    pub time: String,
}

/// `<result code="done"/>` from write endpoints, or `<result>value</result>`
/// from tag operations and the single-value user endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawResult {
    #[serde(rename = "@code", default)]
    pub code: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: Option<String>,
}

impl RawResult {
    pub fn value(self) -> String {
        self.code.or(self.text).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSuggestions {
    #[serde(default)]
    pub popular: Vec<String>,
    #[serde(default)]
    pub recommended: Vec<String>,
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn parse_time(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ApiError::malformed_field(field, value, e))
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| ApiError::malformed_field(field, value, e))
}

pub fn parse_count(field: &'static str, value: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .map_err(|e| ApiError::malformed_field(field, value, e))
}

/// The API spells booleans `yes`/`no`. Anything but `yes` is false.
pub fn parse_flag(value: &str) -> bool {
    value == "yes"
}

/// Split a space-delimited tag attribute. Empty input, and runs of spaces,
/// produce no empty tag names.
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(' ')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

impl TryFrom<RawPost> for Post {
    type Error = ApiError;

    fn try_from(raw: RawPost) -> Result<Self> {
        let time = if raw.time.is_empty() {
            None
        } else {
            Some(parse_time("time", &raw.time)?)
        };

        Ok(Post {
            title: raw.description,
            description: raw.extended,
            hash: raw.hash,
            url: raw.href,
            tags: split_tags(&raw.tag),
            to_read: parse_flag(&raw.toread),
            time,
        })
    }
}

impl TryFrom<RawTag> for Tag {
    type Error = ApiError;

    fn try_from(raw: RawTag) -> Result<Self> {
        Ok(Tag {
            count: parse_count("count", &raw.count)?,
            name: raw.tag,
        })
    }
}

impl TryFrom<RawDate> for PostDate {
    type Error = ApiError;

    fn try_from(raw: RawDate) -> Result<Self> {
        Ok(PostDate {
            date: parse_date("date", &raw.date)?,
            count: parse_count("count", &raw.count)?,
        })
    }
}

impl From<RawSuggestions> for Suggestions {
    fn from(raw: RawSuggestions) -> Self {
        Suggestions {
            popular: raw.popular,
            recommended: raw.recommended,
        }
    }
}

/// Translate every item or fail on the first bad one.
pub(crate) fn translate_all<R, D>(raw: Vec<R>) -> Result<Vec<D>>
where
    D: TryFrom<R, Error = ApiError>,
{
    raw.into_iter().map(D::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw_post() -> RawPost {
        RawPost {
            description: "Texterise".to_string(),
            extended: "Turns HTML into text".to_string(),
            hash: "509c7c6b1ab1a1e6bd1e9b9a8d9c6a19".to_string(),
            href: "http://example.com/x".to_string(),
            tag: "webdev tools".to_string(),
            toread: "yes".to_string(),
            time: "2011-03-24T19:02:07Z".to_string(),
        }
    }

    #[test]
    fn post_fields_are_renamed() {
        let post = Post::try_from(raw_post()).unwrap();
        assert_eq!(post.title, "Texterise");
        assert_eq!(post.description, "Turns HTML into text");
        assert_eq!(post.url, "http://example.com/x");
        assert_eq!(post.tags, vec!["webdev", "tools"]);
        assert!(post.to_read);
        assert_eq!(post.time, Some(Utc.with_ymd_and_hms(2011, 3, 24, 19, 2, 7).unwrap()));
    }

    #[test]
    fn toread_is_only_true_for_yes() {
        for (value, expected) in [("yes", true), ("no", false), ("", false), ("true", false), ("YES", false)] {
            assert_eq!(parse_flag(value), expected, "{value:?}");
        }
    }

    #[test]
    fn missing_time_is_none() {
        let raw = RawPost {
            time: String::new(),
            ..raw_post()
        };
        assert_eq!(Post::try_from(raw).unwrap().time, None);
    }

    #[test]
    fn bad_time_is_malformed_field() {
        let raw = RawPost {
            time: "2011-03-24 19:02:07".to_string(),
            ..raw_post()
        };
        let err = Post::try_from(raw).unwrap_err();
        assert!(matches!(err, ApiError::MalformedField { field: "time", .. }));
    }

    #[test]
    fn empty_tag_string_yields_no_tags() {
        assert!(split_tags("").is_empty());
        assert_eq!(split_tags("a  b"), vec!["a", "b"]);
    }

    #[test]
    fn time_format_roundtrips() {
        let instant = Utc.with_ymd_and_hms(2009, 11, 10, 23, 0, 0).unwrap();
        let text = format_time(&instant);
        assert_eq!(text, "2009-11-10T23:00:00Z");
        assert_eq!(parse_time("dt", &text).unwrap(), instant);
    }

    #[test]
    fn tag_count_must_be_numeric() {
        let ok = Tag::try_from(RawTag {
            tag: "radio".to_string(),
            count: "3".to_string(),
        })
        .unwrap();
        assert_eq!(ok, Tag { name: "radio".to_string(), count: 3 });

        let err = Tag::try_from(RawTag {
            tag: "radio".to_string(),
            count: "three".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::MalformedField { field: "count", .. }));
    }

    #[test]
    fn date_batch_fails_as_a_whole() {
        let raw = vec![
            RawDate {
                date: "2010-11-24".to_string(),
                count: "5".to_string(),
            },
            RawDate {
                date: "24/11/2010".to_string(),
                count: "1".to_string(),
            },
        ];
        let result: Result<Vec<PostDate>> = translate_all(raw);
        assert!(matches!(result, Err(ApiError::MalformedField { field: "date", .. })));
    }

    #[test]
    fn result_prefers_code_attribute() {
        let code = RawResult {
            code: Some("done".to_string()),
            text: None,
        };
        assert_eq!(code.value(), "done");
        let text = RawResult {
            code: None,
            text: Some("6493a84f72d86e7de130".to_string()),
        };
        assert_eq!(text.value(), "6493a84f72d86e7de130");
    }
}
