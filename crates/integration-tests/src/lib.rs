//! Shared fixtures for the end-to-end tests.
//!
//! `TestApp` wires the real router to an in-memory store, a fixed clock and
//! test mode, so every scenario controls time through the override header.

use axum::body::{to_bytes, Body};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::Router;
use pb_api::{AppState, HttpSettings};
use pb_core::clock::FixedClock;
use pb_core::ids::UuidIdGenerator;
use pb_core::lifecycle::{EngineSettings, PasteEngine};
use pb_store_memory::MemoryPasteStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const NOW_HEADER: &str = "x-test-now-ms";
pub const T0: i64 = 1_700_000_000_000;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryPasteStore>,
    pub clock: Arc<FixedClock>,
    pub engine: PasteEngine,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        let store = Arc::new(MemoryPasteStore::new());
        let clock = Arc::new(FixedClock::new(T0));
        let engine = PasteEngine::new(
            store.clone(),
            Arc::new(UuidIdGenerator::default()),
            settings,
        );
        let state = AppState {
            engine: engine.clone(),
            clock: clock.clone(),
            time_override: Some(HeaderName::from_static(NOW_HEADER)),
            public_base_url: None,
        };

        let http = HttpSettings {
            extra_allowed_headers: vec![HeaderName::from_static(NOW_HEADER)],
            ..HttpSettings::default()
        };

        Self {
            router: pb_api::router(state, &http),
            store,
            clock,
            engine,
        }
    }

    /// Creates a paste and returns `(status, body)`.
    pub async fn create(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/pastes")
            .header("host", "paste.test")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("create request");
        self.send_json(request).await
    }

    /// Creates a paste that must succeed and returns its id.
    pub async fn create_ok(&self, body: Value) -> String {
        let (status, created) = self.create(body).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body {created}");
        created["id"].as_str().expect("id").to_string()
    }

    pub async fn inspect(&self, id: &str, now: Option<i64>) -> (StatusCode, Value) {
        self.send_json(get(&format!("/api/pastes/{id}"), now)).await
    }

    pub async fn view(&self, id: &str, now: Option<i64>) -> (StatusCode, String) {
        self.send_text(get(&format!("/p/{id}"), now)).await
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, text) = self.send_text(request).await;
        let json = serde_json::from_str(&text).expect("json body");
        (status, json)
    }

    pub async fn send_text(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get(uri: &str, now: Option<i64>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(now) = now {
        builder = builder.header(NOW_HEADER, now.to_string());
    }
    builder.body(Body::empty()).expect("get request")
}
