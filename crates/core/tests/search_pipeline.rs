//! End-to-end pipeline tests against a fake catalog HTTP server.

use std::sync::Arc;
use std::time::Duration;

use moviefinder_core::catalog::TmdbCatalogClient;
use moviefinder_core::config::CatalogConfig;
use moviefinder_core::pipeline::{
    FetchStateTag, SearchController, SearchPipeline, SearchView, FETCH_ERROR_MESSAGE,
};
use moviefinder_core::testing::{fixtures, MockTrendingStore, RecordedStoreCall};
use moviefinder_core::trending::TrendingAggregator;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUIET: Duration = Duration::from_millis(150);

struct TestPipeline {
    server: MockServer,
    store: Arc<MockTrendingStore>,
    controller: Arc<SearchController>,
    pipeline: SearchPipeline,
}

impl TestPipeline {
    async fn start(server: MockServer) -> Self {
        let catalog = TmdbCatalogClient::new(&CatalogConfig {
            api_key: "test-token".to_string(),
            base_url: server.uri(),
            image_base_url: fixtures::IMAGE_BASE_URL.to_string(),
            timeout_secs: 5,
        })
        .expect("client");
        let store = Arc::new(MockTrendingStore::new());
        let aggregator = Arc::new(TrendingAggregator::new(
            store.clone(),
            fixtures::IMAGE_BASE_URL,
            5,
        ));
        let controller = Arc::new(SearchController::new(Arc::new(catalog), Some(aggregator)));
        let pipeline = SearchPipeline::start(controller.clone(), QUIET).await;

        Self {
            server,
            store,
            controller,
            pipeline,
        }
    }

    /// Wait until the view satisfies `done`, failing after a few seconds.
    async fn wait_for<F>(&self, done: F) -> SearchView
    where
        F: Fn(&SearchView) -> bool,
    {
        let mut rx = self.controller.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let view = rx.borrow_and_update();
                    if done(&*view) {
                        return (*view).clone();
                    }
                }
                rx.changed().await.expect("controller dropped");
            }
        })
        .await
        .expect("view never reached expected state")
    }

    async fn search_terms(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/search/movie")
            .filter_map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "query")
                    .map(|(_, v)| v.into_owned())
            })
            .collect()
    }
}

fn settled(term: &'static str) -> impl Fn(&SearchView) -> bool {
    move |view| view.debounced_term.as_deref() == Some(term) && !view.is_loading
}

async fn mount_discover(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "title": "Popular Movie"}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn startup_renders_discover_listing() {
    let server = MockServer::start().await;
    mount_discover(&server).await;
    let t = TestPipeline::start(server).await;

    let view = t.wait_for(settled("")).await;
    assert_eq!(view.state, FetchStateTag::Rendered);
    assert_eq!(view.movies[0].title, "Popular Movie");
    assert!(t.search_terms().await.is_empty());

    t.pipeline.shutdown();
}

#[tokio::test]
async fn typing_burst_searches_final_term_once() {
    let server = MockServer::start().await;
    mount_discover(&server).await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "batman"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 268, "title": "Batman", "poster_path": "/batman.jpg"},
                {"id": 155, "title": "The Dark Knight"}
            ]
        })))
        .mount(&server)
        .await;
    let t = TestPipeline::start(server).await;
    t.wait_for(settled("")).await;

    for term in ["bat", "batm", "batman"] {
        t.pipeline.input(term).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    let view = t.wait_for(settled("batman")).await;
    assert_eq!(view.state, FetchStateTag::Rendered);
    assert_eq!(view.movies.len(), 2);
    assert_eq!(t.search_terms().await, vec!["batman".to_string()]);

    // The trending write follows the render.
    tokio::time::timeout(Duration::from_secs(5), async {
        while t.store.record_for("batman").await.is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("trending record never written");
    let record = t.store.record_for("batman").await.unwrap();
    assert_eq!(record.count, 1);
    assert_eq!(record.movie_id, Some(268));
    assert_eq!(
        record.poster_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/batman.jpg")
    );

    t.pipeline.shutdown();
}

#[tokio::test]
async fn server_error_shows_message_and_skips_trending() {
    let server = MockServer::start().await;
    mount_discover(&server).await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let t = TestPipeline::start(server).await;
    t.wait_for(settled("")).await;

    t.pipeline.input("heat").await;
    let view = t.wait_for(settled("heat")).await;

    assert_eq!(view.state, FetchStateTag::Failed);
    assert_eq!(view.error_message.as_deref(), Some(FETCH_ERROR_MESSAGE));
    assert!(view.movies.is_empty());
    assert_eq!(t.store.write_count().await, 0);

    t.pipeline.shutdown();
}

#[tokio::test]
async fn no_results_render_empty() {
    let server = MockServer::start().await;
    mount_discover(&server).await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "zzz999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1, "results": [], "total_pages": 0, "total_results": 0
        })))
        .mount(&server)
        .await;
    let t = TestPipeline::start(server).await;
    t.wait_for(settled("")).await;

    t.pipeline.input("zzz999").await;
    let view = t.wait_for(settled("zzz999")).await;

    assert_eq!(view.state, FetchStateTag::RenderedEmpty);
    assert!(view.error_message.is_none());
    // Only the startup ranking read touched the store.
    assert_eq!(
        t.store.recorded_calls().await,
        vec![RecordedStoreCall::Top { limit: 5 }]
    );

    t.pipeline.shutdown();
}

#[tokio::test]
async fn slow_earlier_response_does_not_overwrite_newer() {
    let server = MockServer::start().await;
    mount_discover(&server).await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "alien"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"id": 348, "title": "Alien"}]}))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "aliens"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"id": 679, "title": "Aliens"}]})),
        )
        .mount(&server)
        .await;
    let t = TestPipeline::start(server).await;
    t.wait_for(settled("")).await;

    t.pipeline.input("alien").await;
    // Let "alien" settle and go out, then type on before it answers.
    t.wait_for(|v| v.debounced_term.as_deref() == Some("alien")).await;
    t.pipeline.input("aliens").await;
    t.wait_for(settled("aliens")).await;

    // Outlast the slow response.
    tokio::time::sleep(Duration::from_millis(800)).await;

    let view = t.controller.snapshot().await;
    assert_eq!(view.debounced_term.as_deref(), Some("aliens"));
    assert_eq!(view.movies.len(), 1);
    assert_eq!(view.movies[0].title, "Aliens");
    assert!(t.store.record_for("alien").await.is_none());
    assert_eq!(t.store.record_for("aliens").await.map(|r| r.count), Some(1));

    t.pipeline.shutdown();
}
