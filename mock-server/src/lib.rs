//! In-memory fake of the Pinboard v1 API.
//!
//! Every endpoint is a GET under `/v1/` answering attribute-style XML, with
//! the credential passed as `auth_token=username:token`. A wrong token gets
//! 401; once an optional request budget is spent every request gets 429.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use md5::{Digest, Md5};
use quick_xml::escape::escape;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};

pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DEFAULT_RECENT: usize = 15;
const MAX_RECENT: usize = 100;

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub username: String,
    pub token: String,
    pub secret: String,
    pub api_token: String,
    /// Requests served before every further one is answered with 429.
    pub request_budget: Option<u32>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            username: "user".to_string(),
            token: "token".to_string(),
            secret: "6493a84f72d86e7de130".to_string(),
            api_token: "token".to_string(),
            request_budget: None,
        }
    }
}

impl MockConfig {
    pub fn auth_token(&self) -> String {
        format!("{}:{}", self.username, self.token)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPost {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub time: DateTime<Utc>,
    pub shared: bool,
    pub to_read: bool,
}

impl StoredPost {
    fn has_tags(&self, wanted: &[String]) -> bool {
        wanted.iter().all(|tag| self.tags.contains(tag))
    }

    fn to_xml(&self) -> String {
        let hash = Md5::digest(self.url.as_bytes());
        format!(
            r#"<post href="{}" time="{}" description="{}" extended="{}" tag="{}" hash="{:x}" shared="{}" toread="{}" />"#,
            escape(self.url.as_str()),
            self.time.format(TIME_FORMAT),
            escape(self.title.as_str()),
            escape(self.description.as_str()),
            escape(self.tags.join(" ").as_str()),
            hash,
            yes_no(self.shared),
            yes_no(self.to_read),
        )
    }
}

#[derive(Debug)]
pub struct MockState {
    config: MockConfig,
    posts: BTreeMap<String, StoredPost>,
    updated: DateTime<Utc>,
    served: u32,
}

impl MockState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            posts: BTreeMap::new(),
            updated: now(),
            served: 0,
        }
    }

    fn authorize(&mut self, params: &[(String, String)]) -> Result<(), Response> {
        self.served += 1;
        if let Some(budget) = self.config.request_budget {
            if self.served > budget {
                warn!(served = self.served, budget, "request budget exhausted");
                return Err(xml(
                    StatusCode::TOO_MANY_REQUESTS,
                    r#"<result code="too many requests" />"#.to_string(),
                ));
            }
        }
        if first(params, "auth_token") != Some(self.config.auth_token().as_str()) {
            warn!("rejecting bad auth_token");
            return Err(xml(
                StatusCode::UNAUTHORIZED,
                r#"<result code="401 Forbidden" />"#.to_string(),
            ));
        }
        Ok(())
    }

    /// Posts carrying every tag in `tags`, newest first.
    fn newest_first(&self, tags: &[String]) -> Vec<&StoredPost> {
        let mut posts: Vec<_> = self.posts.values().filter(|p| p.has_tags(tags)).collect();
        posts.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| a.url.cmp(&b.url)));
        posts
    }

    fn tag_counts(&self) -> BTreeMap<&str, u32> {
        let mut counts = BTreeMap::new();
        for tag in self.posts.values().flat_map(|p| p.tags.iter()) {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
        counts
    }

    fn touch(&mut self) {
        self.updated = now();
    }
}

pub type Db = Arc<RwLock<MockState>>;

type Params = Query<Vec<(String, String)>>;

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let db: Db = Arc::new(RwLock::new(MockState::new(config)));
    let api = Router::new()
        .route("/posts/add", get(posts_add))
        .route("/posts/delete", get(posts_delete))
        .route("/posts/get", get(posts_get))
        .route("/posts/recent", get(posts_recent))
        .route("/posts/all", get(posts_all))
        .route("/posts/update", get(posts_update))
        .route("/posts/dates", get(posts_dates))
        .route("/posts/suggest", get(posts_suggest))
        .route("/tags/get", get(tags_get))
        .route("/tags/delete", get(tags_delete))
        .route("/tags/rename", get(tags_rename))
        .route("/user/secret", get(user_secret))
        .route("/user/api_token", get(user_api_token));
    Router::new().nest("/v1", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn first<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Every value under `name`, split on spaces.
fn words(params: &[(String, String)], name: &str) -> Vec<String> {
    params
        .iter()
        .filter(|(n, _)| n == name)
        .flat_map(|(_, v)| v.split(' '))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true`/`yes` are true, `false`/`no` false, anything else `default`.
fn flag(params: &[(String, String)], name: &str, default: bool) -> bool {
    match first(params, name) {
        Some("true" | "yes") => true,
        Some("false" | "no") => false,
        _ => default,
    }
}

fn time_param(params: &[(String, String)], name: &str) -> Option<DateTime<Utc>> {
    first(params, name)
        .and_then(|v| NaiveDateTime::parse_from_str(v, TIME_FORMAT).ok())
        .map(|naive| naive.and_utc())
}

fn xml(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}"),
    )
        .into_response()
}

fn result_code(code: &str) -> Response {
    xml(StatusCode::OK, format!(r#"<result code="{}" />"#, escape(code)))
}

fn result_text(text: &str) -> Response {
    xml(StatusCode::OK, format!("<result>{}</result>", escape(text)))
}

fn posts_xml<'a>(
    user: &str,
    dt: Option<NaiveDate>,
    tags: &[String],
    posts: impl IntoIterator<Item = &'a StoredPost>,
) -> Response {
    let mut body = format!(r#"<posts user="{}""#, escape(user));
    if let Some(dt) = dt {
        body.push_str(&format!(r#" dt="{}""#, dt.format(DATE_FORMAT)));
    }
    body.push_str(&format!(r#" tag="{}">"#, escape(tags.join(" ").as_str())));
    for post in posts {
        body.push_str("\n  ");
        body.push_str(&post.to_xml());
    }
    body.push_str("\n</posts>");
    xml(StatusCode::OK, body)
}

async fn posts_add(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }

    let Some(url) = first(&params, "url").filter(|u| !u.is_empty()) else {
        return result_code("missing url");
    };
    let Some(title) = first(&params, "description").filter(|d| !d.is_empty()) else {
        return result_code("missing description");
    };
    if state.posts.contains_key(url) && !flag(&params, "replace", true) {
        return result_code("item already exists");
    }

    let mut tags = words(&params, "tags");
    tags.dedup();
    let post = StoredPost {
        url: url.to_string(),
        title: title.to_string(),
        description: first(&params, "extended").unwrap_or_default().to_string(),
        tags,
        time: time_param(&params, "dt").unwrap_or_else(now),
        shared: flag(&params, "shared", true),
        to_read: flag(&params, "toread", false),
    };
    debug!(url = %post.url, "storing post");
    state.posts.insert(post.url.clone(), post);
    state.touch();
    result_code("done")
}

async fn posts_delete(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let url = first(&params, "url").unwrap_or_default();
    if state.posts.remove(url).is_none() {
        return result_code("item not found");
    }
    state.touch();
    result_code("done")
}

async fn posts_get(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let tags = words(&params, "tags");
    let posts = state.newest_first(&tags);

    if let Some(url) = first(&params, "url").filter(|u| !u.is_empty()) {
        let matching: Vec<_> = posts.into_iter().filter(|p| p.url == url).collect();
        let dt = matching.first().map(|p| p.time.date_naive());
        return posts_xml(&state.config.username, dt, &tags, matching);
    }

    let day = time_param(&params, "dt")
        .map(|t| t.date_naive())
        .or_else(|| posts.first().map(|p| p.time.date_naive()));
    let matching = posts
        .into_iter()
        .filter(|p| Some(p.time.date_naive()) == day);
    posts_xml(&state.config.username, day, &tags, matching)
}

async fn posts_recent(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let tags = words(&params, "tag");
    let count = first(&params, "count")
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(DEFAULT_RECENT)
        .min(MAX_RECENT);
    let posts = state.newest_first(&tags).into_iter().take(count);
    posts_xml(&state.config.username, None, &tags, posts)
}

async fn posts_all(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let tags = words(&params, "tags");
    let start = first(&params, "start")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);
    let results = first(&params, "results")
        .and_then(|r| r.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let from = time_param(&params, "fromdt");
    let to = time_param(&params, "todt");

    let posts = state
        .newest_first(&tags)
        .into_iter()
        .filter(|p| from.map_or(true, |from| p.time >= from))
        .filter(|p| to.map_or(true, |to| p.time <= to))
        .skip(start)
        .take(results);
    posts_xml(&state.config.username, None, &tags, posts)
}

async fn posts_update(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    xml(
        StatusCode::OK,
        format!(r#"<update time="{}" />"#, state.updated.format(TIME_FORMAT)),
    )
}

async fn posts_dates(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let tags = words(&params, "tags");
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for post in state.newest_first(&tags) {
        *per_day.entry(post.time.date_naive()).or_insert(0) += 1;
    }

    let mut body = format!(
        r#"<dates user="{}" tag="{}">"#,
        escape(state.config.username.as_str()),
        escape(tags.join(" ").as_str())
    );
    for (date, count) in per_day.iter().rev() {
        body.push_str(&format!(
            "\n  <date count=\"{count}\" date=\"{}\" />",
            date.format(DATE_FORMAT)
        ));
    }
    body.push_str("\n</dates>");
    xml(StatusCode::OK, body)
}

async fn posts_suggest(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let url = first(&params, "url").unwrap_or_default();
    let popular = state
        .posts
        .get(url)
        .map(|p| p.tags.clone())
        .unwrap_or_default();

    let counts = state.tag_counts();
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let recommended: Vec<_> = ranked.into_iter().take(3).map(|(tag, _)| tag).collect();

    let mut body = String::from("<suggested>");
    for tag in &popular {
        body.push_str(&format!("<popular>{}</popular>", escape(tag.as_str())));
    }
    for tag in recommended {
        body.push_str(&format!("<recommended>{}</recommended>", escape(tag)));
    }
    body.push_str("</suggested>");
    xml(StatusCode::OK, body)
}

async fn tags_get(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let mut body = String::from("<tags>");
    for (tag, count) in state.tag_counts() {
        body.push_str(&format!(
            "\n  <tag count=\"{count}\" tag=\"{}\" />",
            escape(tag)
        ));
    }
    body.push_str("\n</tags>");
    xml(StatusCode::OK, body)
}

async fn tags_delete(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let tag = first(&params, "tag").unwrap_or_default().to_string();
    for post in state.posts.values_mut() {
        post.tags.retain(|t| *t != tag);
    }
    state.touch();
    result_text("done")
}

async fn tags_rename(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    let (Some(old), Some(new)) = (first(&params, "old"), first(&params, "new")) else {
        return result_text("missing old or new tag");
    };
    let (old, new) = (old.to_string(), new.to_string());
    for post in state.posts.values_mut() {
        if post.tags.contains(&old) {
            let mut seen = BTreeSet::new();
            let renamed = post.tags.iter().map(|t| if *t == old { new.clone() } else { t.clone() });
            post.tags = renamed.filter(|t| seen.insert(t.clone())).collect();
        }
    }
    state.touch();
    result_text("done")
}

async fn user_secret(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    result_text(&state.config.secret)
}

async fn user_api_token(State(db): State<Db>, Query(params): Params) -> Response {
    let mut state = db.write().await;
    if let Err(resp) = state.authorize(&params) {
        return resp;
    }
    result_text(&state.config.api_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_and_spaced_tags_are_flattened() {
        let params = pairs(&[("tags", "one two"), ("tags", "three"), ("url", "x")]);
        assert_eq!(words(&params, "tags"), vec!["one", "two", "three"]);
        assert!(words(&params, "tag").is_empty());
    }

    #[test]
    fn flags_accept_both_spellings() {
        let params = pairs(&[("a", "true"), ("b", "no"), ("c", "maybe")]);
        assert!(flag(&params, "a", false));
        assert!(!flag(&params, "b", true));
        assert!(flag(&params, "c", true));
        assert!(!flag(&params, "missing", false));
    }

    #[test]
    fn post_xml_escapes_attributes() {
        let post = StoredPost {
            url: "http://example.org/?a=1&b=2".to_string(),
            title: "Quotes \"here\"".to_string(),
            description: String::new(),
            tags: vec!["a".to_string(), "b".to_string()],
            time: Utc.with_ymd_and_hms(2011, 3, 24, 19, 2, 7).unwrap(),
            shared: true,
            to_read: false,
        };
        let xml = post.to_xml();
        assert!(xml.contains(r#"href="http://example.org/?a=1&amp;b=2""#));
        assert!(xml.contains("&quot;here&quot;"));
        assert!(xml.contains(r#"tag="a b""#));
        assert!(xml.contains(r#"time="2011-03-24T19:02:07Z""#));
        assert!(xml.contains(r#"toread="no""#));
    }

    #[test]
    fn budget_then_token_are_checked() {
        let mut state = MockState::new(MockConfig {
            request_budget: Some(1),
            ..MockConfig::default()
        });
        let good = pairs(&[("auth_token", "user:token")]);
        let bad = pairs(&[("auth_token", "user:nope")]);
        assert!(state.authorize(&good).is_ok());
        let resp = state.authorize(&good).unwrap_err();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let mut state = MockState::new(MockConfig::default());
        let resp = state.authorize(&bad).unwrap_err();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
