use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::debug;

pub mod fixtures;

const MAX_LIMIT: usize = 20;

/// One blog's canned data.
#[derive(Clone, Debug, Default)]
pub struct BlogFixture {
    pub info: Value,
    /// Newest first.
    pub posts: Vec<Value>,
    pub likes: Vec<Value>,
}

#[derive(Clone, Debug, Default)]
pub struct Store {
    pub blogs: HashMap<String, BlogFixture>,
}

/// A request as the server saw it, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Default)]
pub struct AppState {
    store: Arc<Store>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
            log: Arc::default(),
        }
    }

    pub fn seeded() -> Self {
        Self::new(fixtures::seeded())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with_state(AppState::seeded())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/v2/blog/{blog}/info", get(blog_info))
        .route("/v2/blog/{blog}/posts", get(all_posts))
        .route("/v2/blog/{blog}/posts/{kind}", get(typed_posts))
        .route("/v2/blog/{blog}/likes", get(likes))
        .route("/v2/tagged", get(tagged))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, AppState::seeded()).await
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn record(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let query = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let recorded = RecordedRequest {
        path: request.uri().path().to_string(),
        query,
        authorization,
    };
    debug!(path = %recorded.path, params = recorded.query.len(), "request");
    if let Ok(mut log) = state.log.lock() {
        log.push(recorded);
    }
    next.run(request).await
}

fn envelope(status: StatusCode, response: Value) -> Reply {
    let msg = status.canonical_reason().unwrap_or("");
    (
        status,
        Json(json!({
            "meta": {"status": status.as_u16(), "msg": msg},
            "response": response
        })),
    )
}

fn ok(response: Value) -> Reply {
    envelope(StatusCode::OK, response)
}

fn error(status: StatusCode) -> Reply {
    envelope(status, json!([]))
}

fn param<'a>(query: &'a [(String, String)], name: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Parse `offset` and `limit` with the API's defaults.
fn page(query: &[(String, String)]) -> Result<(usize, usize), StatusCode> {
    let offset = match param(query, "offset") {
        Some(v) => v.parse().map_err(|_| StatusCode::BAD_REQUEST)?,
        None => 0,
    };
    let limit = match param(query, "limit") {
        Some(v) => v.parse::<usize>().map_err(|_| StatusCode::BAD_REQUEST)?,
        None => MAX_LIMIT,
    };
    if limit == 0 || limit > MAX_LIMIT {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok((offset, limit))
}

fn has_tag(post: &Value, tag: &str) -> bool {
    post["tags"]
        .as_array()
        .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
}

fn with_requested_info(mut post: Value, query: &[(String, String)]) -> Value {
    if let Some(obj) = post.as_object_mut() {
        if param(query, "notes_info") == Some("true") {
            obj.insert(
                "notes".to_string(),
                json!([{"type": "like", "blog_name": "fan", "blog_url": "https://fan.tumblr.com/"}]),
            );
        }
        if param(query, "reblog_info") == Some("true") {
            obj.insert("reblogged_from_id".to_string(), json!("1"));
            obj.insert("reblogged_from_name".to_string(), json!("origin"));
        }
    }
    post
}

async fn blog_info(State(state): State<AppState>, Path(blog): Path<String>) -> Reply {
    let store = &state.store;
    match store.blogs.get(&blog) {
        Some(fixture) => ok(json!({"blog": fixture.info})),
        None => error(StatusCode::NOT_FOUND),
    }
}

async fn all_posts(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    posts(state, blog, None, query).await
}

async fn typed_posts(
    State(state): State<AppState>,
    Path((blog, kind)): Path<(String, String)>,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    posts(state, blog, Some(kind), query).await
}

async fn posts(state: AppState, blog: String, kind: Option<String>, query: Vec<(String, String)>) -> Reply {
    let (offset, limit) = match page(&query) {
        Ok(page) => page,
        Err(status) => return error(status),
    };
    let store = &state.store;
    let Some(fixture) = store.blogs.get(&blog) else {
        return error(StatusCode::NOT_FOUND);
    };

    let id = param(&query, "id").and_then(|v| v.parse::<u64>().ok());
    let tag = param(&query, "tag");
    let matching: Vec<&Value> = fixture
        .posts
        .iter()
        .filter(|p| kind.as_deref().map_or(true, |k| p["type"] == k))
        .filter(|p| id.map_or(true, |id| p["id"].as_u64() == Some(id)))
        .filter(|p| tag.map_or(true, |t| has_tag(p, t)))
        .collect();
    let total = matching.len();
    let page: Vec<Value> = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|p| with_requested_info(p.clone(), &query))
        .collect();

    ok(json!({"blog": fixture.info, "posts": page, "total_posts": total}))
}

async fn likes(
    State(state): State<AppState>,
    Path(blog): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply {
    let (offset, limit) = match page(&query) {
        Ok(page) => page,
        Err(status) => return error(status),
    };
    let store = &state.store;
    let Some(fixture) = store.blogs.get(&blog) else {
        return error(StatusCode::NOT_FOUND);
    };
    let liked: Vec<&Value> = fixture.likes.iter().skip(offset).take(limit).collect();
    ok(json!({"liked_posts": liked, "liked_count": fixture.likes.len()}))
}

async fn tagged(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    headers: axum::http::HeaderMap,
) -> Reply {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("OAuth "));
    if !authorized {
        return error(StatusCode::UNAUTHORIZED);
    }
    let Some(tag) = param(&query, "tag").filter(|t| !t.is_empty()) else {
        return error(StatusCode::BAD_REQUEST);
    };
    let (_, limit) = match page(&query) {
        Ok(page) => page,
        Err(status) => return error(status),
    };
    let before = param(&query, "before").and_then(|v| v.parse::<i64>().ok());

    let store = &state.store;
    let mut matching: Vec<&Value> = store
        .blogs
        .values()
        .flat_map(|fixture| fixture.posts.iter())
        .filter(|p| has_tag(p, tag))
        .filter(|p| before.map_or(true, |b| p["timestamp"].as_i64().is_some_and(|ts| ts < b)))
        .collect();
    matching.sort_by_key(|p| std::cmp::Reverse(p["timestamp"].as_i64().unwrap_or_default()));
    matching.truncate(limit);

    ok(json!(matching))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn page_defaults() {
        assert_eq!(page(&[]), Ok((0, 20)));
        assert_eq!(page(&query(&[("offset", "5"), ("limit", "3")])), Ok((5, 3)));
    }

    #[test]
    fn page_rejects_bad_limits() {
        assert_eq!(page(&query(&[("limit", "0")])), Err(StatusCode::BAD_REQUEST));
        assert_eq!(page(&query(&[("limit", "21")])), Err(StatusCode::BAD_REQUEST));
        assert_eq!(page(&query(&[("offset", "x")])), Err(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn envelope_shape() {
        let (status, Json(body)) = error(StatusCode::NOT_FOUND);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["meta"]["status"], 404);
        assert_eq!(body["meta"]["msg"], "Not Found");
        assert_eq!(body["response"], json!([]));
    }

    #[test]
    fn seeded_store_covers_every_post_type() {
        let store = fixtures::seeded();
        let staff = &store.blogs["staff"];
        let mut kinds: Vec<_> = staff.posts.iter().map(|p| p["type"].as_str().unwrap()).collect();
        kinds.sort();
        assert_eq!(
            kinds,
            vec!["answer", "audio", "chat", "link", "photo", "quote", "text", "video"]
        );
    }

    #[test]
    fn requested_info_is_attached() {
        let post = with_requested_info(json!({"id": 1}), &query(&[("notes_info", "true")]));
        assert!(post["notes"].is_array());
        assert!(post.get("reblogged_from_id").is_none());
    }
}
