use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, MockConfig};
use tower::ServiceExt;

const AUTH: &str = "auth_token=user%3Atoken";

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn call(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app.clone().oneshot(get(uri)).await.unwrap();
    let status = resp.status();
    (status, body_text(resp).await)
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = app();
    let (status, body) = call(&app, "/v1/tags/get").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("<result code="));
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let app = app();
    let (status, _) = call(&app, "/v1/tags/get?auth_token=user%3Awrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn exhausted_budget_is_rate_limited() {
    let app = app_with(MockConfig {
        request_budget: Some(2),
        ..MockConfig::default()
    });
    for _ in 0..2 {
        let (status, _) = call(&app, &format!("/v1/posts/update?{AUTH}")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = call(&app, &format!("/v1/posts/update?{AUTH}")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body.contains("too many requests"));
}

// --- posts ---

#[tokio::test]
async fn empty_account_lists_nothing() {
    let app = app();
    let (status, body) = call(&app, &format!("/v1/posts/recent?{AUTH}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<posts user="user""#));
    assert!(!body.contains("<post "));

    let (_, body) = call(&app, &format!("/v1/tags/get?{AUTH}")).await;
    assert!(!body.contains("<tag "));
}

#[tokio::test]
async fn add_then_get_by_url() {
    let app = app();
    let (status, body) = call(
        &app,
        &format!(
            "/v1/posts/add?{AUTH}&url=http%3A%2F%2Fexample.org&description=Example\
             &tags=one&tags=two&dt=2011-03-24T19%3A02%3A07Z&toread=true"
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<result code="done" />"#));

    let (_, body) = call(&app, &format!("/v1/posts/get?{AUTH}&url=http%3A%2F%2Fexample.org")).await;
    assert!(body.contains(r#"href="http://example.org""#));
    assert!(body.contains(r#"tag="one two""#));
    assert!(body.contains(r#"toread="yes""#));
    assert!(body.contains(r#"time="2011-03-24T19:02:07Z""#));
    assert!(body.contains(r#"dt="2011-03-24""#));
}

#[tokio::test]
async fn add_without_replace_refuses_duplicates() {
    let app = app();
    let add = format!("/v1/posts/add?{AUTH}&url=http%3A%2F%2Fexample.org&description=Example");
    let (_, body) = call(&app, &add).await;
    assert!(body.contains("done"));

    let (_, body) = call(&app, &format!("{add}&replace=false")).await;
    assert!(body.contains("item already exists"));
}

#[tokio::test]
async fn add_requires_url_and_description() {
    let app = app();
    let (_, body) = call(&app, &format!("/v1/posts/add?{AUTH}&description=x")).await;
    assert!(body.contains("missing url"));
    let (_, body) = call(&app, &format!("/v1/posts/add?{AUTH}&url=http%3A%2F%2Fx")).await;
    assert!(body.contains("missing description"));
}

#[tokio::test]
async fn delete_unknown_post() {
    let app = app();
    let (status, body) = call(&app, &format!("/v1/posts/delete?{AUTH}&url=http%3A%2F%2Fnope")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("item not found"));
}

#[tokio::test]
async fn dates_group_posts_by_day() {
    let app = app();
    for (url, dt) in [
        ("a", "2010-11-24T10%3A00%3A00Z"),
        ("b", "2010-11-24T11%3A00%3A00Z"),
        ("c", "2010-11-23T09%3A00%3A00Z"),
    ] {
        call(
            &app,
            &format!("/v1/posts/add?{AUTH}&url=http%3A%2F%2F{url}&description={url}&tags=argentina&dt={dt}"),
        )
        .await;
    }
    let (_, body) = call(&app, &format!("/v1/posts/dates?{AUTH}&tags=argentina")).await;
    let first = body.find(r#"<date count="2" date="2010-11-24" />"#).unwrap();
    let second = body.find(r#"<date count="1" date="2010-11-23" />"#).unwrap();
    assert!(first < second);
}

// --- tags ---

#[tokio::test]
async fn rename_merges_and_delete_removes() {
    let app = app();
    call(
        &app,
        &format!("/v1/posts/add?{AUTH}&url=http%3A%2F%2Fx&description=x&tags=old+keep+new"),
    )
    .await;

    let (_, body) = call(&app, &format!("/v1/tags/rename?{AUTH}&old=old&new=new")).await;
    assert!(body.contains("<result>done</result>"));
    let (_, body) = call(&app, &format!("/v1/tags/get?{AUTH}")).await;
    assert!(body.contains(r#"<tag count="1" tag="new" />"#));
    assert!(body.contains(r#"<tag count="1" tag="keep" />"#));
    assert!(!body.contains(r#"tag="old""#));

    call(&app, &format!("/v1/tags/delete?{AUTH}&tag=keep")).await;
    let (_, body) = call(&app, &format!("/v1/tags/get?{AUTH}")).await;
    assert!(!body.contains(r#"tag="keep""#));
}

// --- user ---

#[tokio::test]
async fn user_values_are_element_text() {
    let app = app();
    let (_, body) = call(&app, &format!("/v1/user/secret?{AUTH}")).await;
    assert!(body.contains("<result>6493a84f72d86e7de130</result>"));
    let (_, body) = call(&app, &format!("/v1/user/api_token?{AUTH}")).await;
    assert!(body.contains("<result>token</result>"));
}
