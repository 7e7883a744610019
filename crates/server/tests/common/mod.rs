//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock catalog and trending store injected, so the whole search
//! flow runs without network access.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use moviefinder_core::testing::{MockMovieCatalog, MockTrendingStore};
use moviefinder_core::{
    load_config_from_str, SearchController, SearchPipeline, TrendingAggregator,
};
use moviefinder_server::state::AppState;

/// Re-export fixtures for test convenience
pub use moviefinder_core::testing::fixtures;

/// Quiet period used by fixtures. Short, so tests settle quickly.
pub const TEST_DEBOUNCE: Duration = Duration::from_millis(50);

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.catalog.set_results("dune", vec![fixtures::movie(1, "Dune")]).await;
///
///     fixture.put("/api/v1/search/input", json!({ "term": "dune" })).await;
///     let view = fixture.wait_for_view(|v| v["debounced_term"] == "dune").await;
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure results per term
    pub catalog: Arc<MockMovieCatalog>,
    /// Mock trending store - inspect and seed counters
    pub store: Arc<MockTrendingStore>,
    /// Shared state, kept for shutdown
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with a trending store.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let catalog = Arc::new(MockMovieCatalog::new());
        let store = Arc::new(MockTrendingStore::new());

        for (term, count) in &test_config.seed_trending {
            store.insert(fixtures::trending_record(term, *count)).await;
        }

        let backend = if test_config.disable_trending {
            "none"
        } else {
            "sqlite"
        };
        let config = load_config_from_str(&format!(
            r#"
[server]
host = "127.0.0.1"
port = 8080

[catalog]
api_key = "test-secret-token"
image_base_url = "{}"

[search]
debounce_ms = {}
trending_limit = 5

[trending]
backend = "{}"
"#,
            fixtures::IMAGE_BASE_URL,
            TEST_DEBOUNCE.as_millis(),
            backend
        ))
        .expect("Failed to build test config");

        let aggregator = (!test_config.disable_trending).then(|| {
            Arc::new(TrendingAggregator::new(
                Arc::clone(&store) as Arc<dyn moviefinder_core::TrendingStore>,
                fixtures::IMAGE_BASE_URL,
                config.search.trending_limit,
            ))
        });

        let controller = Arc::new(SearchController::new(
            Arc::clone(&catalog) as Arc<dyn moviefinder_core::MovieCatalog>,
            aggregator,
        ));
        let pipeline = SearchPipeline::start(controller, TEST_DEBOUNCE).await;

        let state = Arc::new(AppState::new(config, pipeline));
        let router = moviefinder_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            catalog,
            store,
            state,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a request with raw string body (for testing malformed JSON).
    pub async fn put_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Poll `GET /api/v1/search` until `done` holds, failing after a few seconds.
    pub async fn wait_for_view<F>(&self, done: F) -> Value
    where
        F: Fn(&Value) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let response = self.get("/api/v1/search").await;
                if done(&response.body) {
                    return response.body;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("search view never reached expected state")
    }

    /// Wait until the fetch for `term` has resolved.
    pub async fn wait_settled(&self, term: &str) -> Value {
        self.wait_for_view(|v| v["debounced_term"] == term && v["is_loading"] == false)
            .await
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

impl Drop for TestFixture {
    fn drop(&mut self) {
        self.state.pipeline().shutdown();
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Run without a trending store
    pub disable_trending: bool,
    /// Counters present in the store before startup
    pub seed_trending: Vec<(String, u64)>,
}

impl TestConfig {
    /// Create config with no trending store.
    pub fn without_trending() -> Self {
        Self {
            disable_trending: true,
            ..Default::default()
        }
    }

    /// Create config with counters already in the store.
    pub fn with_trending(seed: &[(&str, u64)]) -> Self {
        Self {
            disable_trending: false,
            seed_trending: seed.iter().map(|(t, c)| (t.to_string(), *c)).collect(),
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
