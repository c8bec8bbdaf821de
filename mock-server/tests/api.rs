use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, AppState, BlogFixture, Store};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn signed_get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, r#"OAuth oauth_consumer_key="ck""#)
        .body(String::new())
        .unwrap()
}

// --- info ---

#[tokio::test]
async fn blog_info_is_wrapped_in_envelope() {
    let resp = app().oneshot(get("/v2/blog/staff/info")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["meta"]["status"], 200);
    assert_eq!(body["meta"]["msg"], "OK");
    assert_eq!(body["response"]["blog"]["name"], "staff");
    assert_eq!(body["response"]["blog"]["posts"], 8);
}

#[tokio::test]
async fn unknown_blog_returns_404_envelope() {
    let resp = app().oneshot(get("/v2/blog/nobody/info")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["meta"]["status"], 404);
    assert_eq!(body["meta"]["msg"], "Not Found");
}

#[tokio::test]
async fn custom_store_is_served_as_given() {
    let mut store = Store::default();
    store.blogs.insert(
        "solo".to_string(),
        BlogFixture {
            info: serde_json::json!({"name": "solo", "posts": 0}),
            ..BlogFixture::default()
        },
    );
    let app = app_with_state(AppState::new(store));

    let resp = app.clone().oneshot(get("/v2/blog/solo/info")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["response"]["blog"]["name"], "solo");

    let resp = app.oneshot(get("/v2/blog/staff/info")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- posts ---

#[tokio::test]
async fn posts_default_to_twenty() {
    let resp = app().oneshot(get("/v2/blog/david/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["response"]["posts"].as_array().unwrap().len(), 20);
    assert_eq!(body["response"]["total_posts"], 25);
    assert_eq!(body["response"]["posts"][0]["id"], 25);
}

#[tokio::test]
async fn posts_honour_offset_and_limit() {
    let resp = app()
        .oneshot(get("/v2/blog/david/posts?offset=20&limit=10"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    let posts = body["response"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 5);
    assert_eq!(posts[0]["id"], 5);
}

#[tokio::test]
async fn posts_filter_by_type_path() {
    let resp = app().oneshot(get("/v2/blog/staff/posts/photo")).await.unwrap();

    let body = body_json(resp).await;
    let posts = body["response"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["type"], "photo");
}

#[tokio::test]
async fn posts_lookup_by_id() {
    let resp = app().oneshot(get("/v2/blog/staff/posts?id=106")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["response"]["posts"][0]["type"], "quote");

    let resp = app().oneshot(get("/v2/blog/staff/posts?id=999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["response"]["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn posts_reject_oversized_limit() {
    let resp = app()
        .oneshot(get("/v2/blog/staff/posts?limit=21"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- likes ---

#[tokio::test]
async fn likes_are_listed() {
    let resp = app().oneshot(get("/v2/blog/staff/likes?limit=2")).await.unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["response"]["liked_count"], 3);
    assert_eq!(body["response"]["liked_posts"].as_array().unwrap().len(), 2);
}

// --- tagged ---

#[tokio::test]
async fn tagged_requires_oauth_header() {
    let resp = app().oneshot(get("/v2/tagged?tag=gif")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tagged_returns_bare_array_newest_first() {
    let resp = app().oneshot(signed_get("/v2/tagged?tag=gif")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let kinds: Vec<_> = body["response"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["photo", "chat", "video"]);
}

#[tokio::test]
async fn tagged_honours_before() {
    let resp = app()
        .oneshot(signed_get("/v2/tagged?tag=gif&before=1400000500"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    let ids: Vec<_> = body["response"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![104, 102]);
}

#[tokio::test]
async fn tagged_without_tag_is_bad_request() {
    let resp = app().oneshot(signed_get("/v2/tagged")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- request log ---

#[tokio::test]
async fn requests_are_recorded_in_order() {
    let state = AppState::seeded();
    let app = app_with_state(state.clone());

    app.clone()
        .oneshot(get("/v2/blog/staff/posts?offset=2&filter=raw"))
        .await
        .unwrap();
    app.oneshot(signed_get("/v2/tagged?tag=gif")).await.unwrap();

    let requests = state.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/v2/blog/staff/posts");
    assert_eq!(
        requests[0].query,
        vec![
            ("offset".to_string(), "2".to_string()),
            ("filter".to_string(), "raw".to_string())
        ]
    );
    assert!(requests[0].authorization.is_none());
    assert_eq!(requests[1].param("tag"), Some("gif"));
    assert!(requests[1].authorization.is_some());
}
