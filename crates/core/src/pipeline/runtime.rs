//! Event loop wiring input, debouncer and controller together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info};

use super::controller::SearchController;
use crate::debounce::Debouncer;

/// A running search pipeline.
///
/// Input changes go through [`input`](Self::input); every settled term that
/// differs from the last fetched one starts a fetch on its own task.
pub struct SearchPipeline {
    controller: Arc<SearchController>,
    debouncer: Debouncer,
    /// Held across recording and observing an input, so the displayed term
    /// and the debounced term see changes in the same order.
    input_order: Mutex<()>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SearchPipeline {
    /// Start the pipeline: fetch the discover listing for the initial empty
    /// term, load the trending ranking once, and listen for settled terms.
    pub async fn start(controller: Arc<SearchController>, quiet: Duration) -> Self {
        let (debouncer, settled_rx) = Debouncer::new(quiet);
        let (shutdown_tx, _) = broadcast::channel(1);

        info!(
            "Starting search pipeline (quiet period {}ms, trending {})",
            quiet.as_millis(),
            if controller.has_trending() { "on" } else { "off" }
        );

        // Initial discover listing, without waiting for the quiet period.
        let ticket = controller.begin(String::new()).await;
        let initial = Arc::clone(&controller);
        tokio::spawn(async move {
            initial.complete(ticket).await;
        });

        if controller.has_trending() {
            let trending = Arc::clone(&controller);
            tokio::spawn(async move {
                trending.refresh_trending().await;
            });
        }

        tokio::spawn(Self::run_loop(
            Arc::clone(&controller),
            settled_rx,
            shutdown_tx.subscribe(),
        ));

        Self {
            controller,
            debouncer,
            input_order: Mutex::new(()),
            shutdown_tx,
        }
    }

    async fn run_loop(
        controller: Arc<SearchController>,
        mut settled_rx: mpsc::UnboundedReceiver<String>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        debug!("Search event loop started");
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Search event loop received shutdown signal");
                    break;
                }
                settled = settled_rx.recv() => {
                    let Some(term) = settled else {
                        break;
                    };
                    // Begin here, in arrival order, so request ids follow
                    // settle order regardless of task scheduling.
                    if let Some(ticket) = controller.settle(term).await {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move {
                            controller.complete(ticket).await;
                        });
                    }
                }
            }
        }
        debug!("Search event loop stopped");
    }

    /// Feed one input change.
    pub async fn input(&self, term: impl Into<String>) {
        let term = term.into();
        let _order = self.input_order.lock().await;
        self.controller.set_input(&term).await;
        self.debouncer.observe(term);
    }

    pub fn controller(&self) -> &Arc<SearchController> {
        &self.controller
    }

    /// Whether an input change is still waiting out the quiet period.
    pub fn has_pending_input(&self) -> bool {
        self.debouncer.has_pending()
    }

    /// Stop listening for settled terms. In-flight fetches still resolve.
    pub fn shutdown(&self) {
        self.debouncer.cancel();
        let _ = self.shutdown_tx.send(());
        info!("Search pipeline stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FetchStateTag;
    use crate::testing::{fixtures, MockMovieCatalog, RecordedCatalogQuery};
    use tokio::time::sleep;

    const QUIET: Duration = Duration::from_millis(500);

    async fn settle_all() {
        // Let the quiet period elapse and spawned fetches finish.
        sleep(QUIET * 2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_discovers_immediately() {
        let catalog = Arc::new(MockMovieCatalog::new());
        catalog
            .set_discover_results(vec![fixtures::movie(1, "Popular")])
            .await;
        let controller = Arc::new(SearchController::new(catalog.clone(), None));

        let pipeline = SearchPipeline::start(controller.clone(), QUIET).await;
        assert!(controller.snapshot().await.is_loading);

        sleep(Duration::from_millis(1)).await;
        assert_eq!(controller.snapshot().await.state, FetchStateTag::Rendered);
        assert_eq!(catalog.recorded_queries().await, vec![RecordedCatalogQuery::Discover]);

        pipeline.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_fetches_once() {
        let catalog = Arc::new(MockMovieCatalog::new());
        catalog
            .set_results("batman", vec![fixtures::movie(268, "Batman")])
            .await;
        let controller = Arc::new(SearchController::new(catalog.clone(), None));
        let pipeline = SearchPipeline::start(controller.clone(), QUIET).await;
        settle_all().await;
        catalog.clear_recorded().await;

        pipeline.input("bat").await;
        sleep(Duration::from_millis(80)).await;
        pipeline.input("batm").await;
        sleep(Duration::from_millis(80)).await;
        pipeline.input("batman").await;
        assert!(pipeline.has_pending_input());
        settle_all().await;

        assert_eq!(
            catalog.recorded_queries().await,
            vec![RecordedCatalogQuery::Search {
                term: "batman".to_string()
            }]
        );
        let view = controller.snapshot().await;
        assert_eq!(view.search_term, "batman");
        assert_eq!(view.movies[0].title, "Batman");

        pipeline.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_inputs_settle_on_displayed_term() {
        let catalog = Arc::new(MockMovieCatalog::new());
        let controller = Arc::new(SearchController::new(catalog.clone(), None));
        let pipeline = SearchPipeline::start(controller.clone(), QUIET).await;
        settle_all().await;

        let terms: Vec<String> = (0..16).map(|i| format!("term{}", i)).collect();
        futures::future::join_all(terms.iter().map(|t| pipeline.input(t.as_str()))).await;
        settle_all().await;

        let view = controller.snapshot().await;
        assert_eq!(view.debounced_term.as_deref(), Some(view.search_term.as_str()));
        assert_eq!(catalog.query_count().await, 2);

        pipeline.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_returning_to_same_term_does_not_refetch() {
        let catalog = Arc::new(MockMovieCatalog::new());
        let controller = Arc::new(SearchController::new(catalog.clone(), None));
        let pipeline = SearchPipeline::start(controller.clone(), QUIET).await;
        settle_all().await;

        pipeline.input("d").await;
        sleep(Duration::from_millis(50)).await;
        pipeline.input("").await;
        settle_all().await;

        assert_eq!(catalog.query_count().await, 1);
        pipeline.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_fetching() {
        let catalog = Arc::new(MockMovieCatalog::new());
        let controller = Arc::new(SearchController::new(catalog.clone(), None));
        let pipeline = SearchPipeline::start(controller.clone(), QUIET).await;
        settle_all().await;

        pipeline.input("heat").await;
        pipeline.shutdown();
        settle_all().await;

        assert_eq!(catalog.query_count().await, 1);
    }
}
