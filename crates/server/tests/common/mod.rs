//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling comprehensive E2E testing
//! without a real list backend.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use shelfview_core::{
    config::{BackendConfig, DatabaseConfig, ListConfig, PresetsConfig, ServerConfig},
    item::RawTrackedItem,
    testing::{MockListFetcher, MockMutationClient, MockPresetPersistence},
    Config, ListFetcher, ListSession, MutationClient, PresetPersistence, SessionOptions,
};
use shelfview_server::state::AppState;

/// Re-export fixtures for test convenience
pub use shelfview_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - List fetches (MockListFetcher)
/// - Item mutations (MockMutationClient)
/// - Preset persistence (MockPresetPersistence)
///
/// The "all" key serves the sample collection, "watching" its watching
/// subset.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_switch_key() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/view/key", json!({ "key": "all" })).await;
///
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The session behind the router
    pub session: Arc<ListSession>,
    /// Mock fetcher - configure per-key responses
    pub fetcher: Arc<MockListFetcher>,
    /// Mock mutation client - register per-item failures
    pub mutations: Arc<MockMutationClient>,
    /// Mock preset persistence - seed presets, inject failures
    pub persistence: Arc<MockPresetPersistence>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_persistence(MockPresetPersistence::new()).await
    }

    /// Create a test fixture around a prepared preset persistence mock.
    pub async fn with_persistence(persistence: MockPresetPersistence) -> Self {
        let fetcher = Arc::new(MockListFetcher::new());
        let mutations = Arc::new(MockMutationClient::new());
        let persistence = Arc::new(persistence);

        let collection = fixtures::sample_collection();
        fetcher.set_items(
            "all",
            collection.iter().map(RawTrackedItem::from).collect(),
        );
        fetcher.set_items(
            "watching",
            collection
                .iter()
                .filter(|item| item.status == shelfview_core::WatchStatus::Watching)
                .map(RawTrackedItem::from)
                .collect(),
        );

        // Create config
        let config = Config {
            backend: BackendConfig {
                base_url: "http://backend.invalid".to_string(),
                api_token: Some("test-token".to_string()),
                timeout_secs: 5,
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig::default(),
            list: ListConfig::default(),
            presets: PresetsConfig::default(),
        };

        let session = Arc::new(ListSession::new(
            Arc::clone(&fetcher) as Arc<dyn ListFetcher>,
            Arc::clone(&mutations) as Arc<dyn MutationClient>,
            Arc::clone(&persistence) as Arc<dyn PresetPersistence>,
            SessionOptions {
                search_debounce: Duration::from_millis(20),
                ..SessionOptions::from(&config.list)
            },
        ));
        session.presets().load().await;

        // Create app state and router
        let state = Arc::new(AppState::new(config, Arc::clone(&session)));
        let router = shelfview_server::api::create_router(state);

        Self {
            router,
            session,
            fetcher,
            mutations,
            persistence,
        }
    }

    /// Activate `key` and wait for its fetch to settle.
    pub async fn activate(&self, key: &str) -> TestResponse {
        let response = self
            .post("/api/v1/view/key", serde_json::json!({ "key": key }))
            .await;
        assert_eq!(response.status, StatusCode::ACCEPTED);
        self.get("/api/v1/view?wait=true").await
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
