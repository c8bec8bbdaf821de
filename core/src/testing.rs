//! Test transports and fixtures shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::TumblrError;
use crate::http::{HttpRequest, HttpResponse, Transport};

#[derive(Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl RecordingTransport {
    pub fn replying(responses: Vec<HttpResponse>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TumblrError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TumblrError::Transport("no canned response".to_string()))
    }
}

/// Accepts every request and never answers.
#[derive(Default)]
pub struct HangingTransport {
    started: AtomicUsize,
}

impl HangingTransport {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for HangingTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TumblrError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<Result<HttpResponse, TumblrError>>().await
    }
}

/// A 200 response wrapping `response` in the API envelope.
pub fn ok(response: Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: Vec::new(),
        body: json!({"meta": {"status": 200, "msg": "OK"}, "response": response}).to_string(),
    }
}

pub fn error(status: u16, msg: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: Vec::new(),
        body: json!({"meta": {"status": status, "msg": msg}, "response": []}).to_string(),
    }
}

pub fn post(kind: &str, id: u64) -> Value {
    let mut value = json!({
        "type": kind,
        "id": id,
        "blog_name": "staff",
        "timestamp": 1_400_000_000,
    });
    let extra = match kind {
        "quote" => json!({"text": "quoted"}),
        "link" => json!({"url": "https://example.com"}),
        "answer" => json!({"asking_name": "anon", "question": "q", "answer": "a"}),
        _ => json!({}),
    };
    if let (Some(obj), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        obj.extend(extra.clone());
    }
    value
}
