//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::TimeZone;
use http_body_util::BodyExt;
use tower::ServiceExt;

use taleforge_api::routes;
use taleforge_api::state::AppState;
use taleforge_core::clock::Clock;
use taleforge_core::store::StoryStore;
use taleforge_core::task::TaskExecutor;
use taleforge_genai::TextGenerator;
use taleforge_jobs::JobOrchestrator;
use taleforge_test_support::{FixedClock, InMemoryStoryStore, QueueExecutor, ScriptedGenerator};

/// Default narrative text returned by the scripted generator.
pub const STORY_TEXT: &str = "A dragon wandered far from home.";

/// A fully wired app over fakes: in-memory store, scripted provider, fixed
/// clock, and a drainable executor so tests decide when background work
/// runs.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStoryStore>,
    pub executor: Arc<QueueExecutor>,
}

impl TestApp {
    /// Runs all scheduled background jobs to completion.
    pub async fn drain_jobs(&self) {
        self.executor.drain().await;
    }
}

/// Build the app with the default scripted generator.
pub fn build_test_app() -> TestApp {
    build_test_app_with_generator(Arc::new(ScriptedGenerator::new(STORY_TEXT)))
}

/// Build the app with a custom generator. Uses the same route structure as
/// `main.rs`.
pub fn build_test_app_with_generator(generator: Arc<dyn TextGenerator>) -> TestApp {
    let store = Arc::new(InMemoryStoryStore::new());
    let executor = Arc::new(QueueExecutor::new());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(
        chrono::Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ));

    let orchestrator = Arc::new(JobOrchestrator::new(
        Arc::clone(&store) as Arc<dyn StoryStore>,
        generator,
        clock,
        Arc::clone(&executor) as Arc<dyn TaskExecutor>,
    ));
    let app_state = AppState::new(Arc::clone(&store) as Arc<dyn StoryStore>, orchestrator);

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/stories", routes::stories::router())
        .with_state(app_state);

    TestApp {
        router,
        store,
        executor,
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let (status, _, json) = post_json_with_headers(app, uri, body, &[]).await;
    (status, json)
}

/// Send a POST request with a JSON body and extra headers; return status,
/// response headers, and body.
pub async fn post_json_with_headers(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let response_headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, response_headers, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body_bytes) = get_raw(app, uri).await;
    (status, serde_json::from_slice(&body_bytes).unwrap())
}

/// Send a GET request and return the raw body bytes.
pub async fn get_raw(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, body_bytes.to_vec())
}
