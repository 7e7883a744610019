//! Search controller: owns render state and applies fetch outcomes.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info};

use super::state::{
    FetchState, FetchStateTag, SearchView, FETCH_ERROR_MESSAGE, UPSTREAM_FALLBACK_MESSAGE,
};
use crate::catalog::{CatalogError, CatalogPage, MovieCatalog, MovieSummary, SearchMode};
use crate::metrics::STALE_RESPONSES;
use crate::trending::{TrendingAggregator, TrendingRecord};

/// Handle for one fetch, issued by [`SearchController::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Request id, strictly increasing per controller.
    pub id: u64,
    pub term: String,
}

impl FetchTicket {
    pub fn mode(&self) -> SearchMode {
        SearchMode::for_term(&self.term)
    }
}

/// What [`SearchController::resolve`] did with an outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A newer fetch had started; the outcome was dropped.
    Stale,
    /// The outcome became the visible state.
    Applied {
        state: FetchStateTag,
        /// Top result to count as trending, set only for a non-empty term
        /// with at least one result.
        representative: Option<MovieSummary>,
    },
}

impl Resolution {
    pub fn is_stale(&self) -> bool {
        matches!(self, Resolution::Stale)
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    search_term: String,
    debounced_term: Option<String>,
    fetch: FetchState,
    trending: Vec<TrendingRecord>,
    last_issued: u64,
}

impl ControllerState {
    fn view(&self) -> SearchView {
        SearchView::new(
            &self.search_term,
            self.debounced_term.as_deref(),
            &self.fetch,
            &self.trending,
        )
    }
}

/// Coordinates settled terms, catalog fetches, render state and the
/// trending side effect.
///
/// State lives behind a lock that is never held across a network call, so
/// fetches for different terms can overlap. Only the most recently begun
/// fetch may change what is rendered.
pub struct SearchController {
    catalog: Arc<dyn MovieCatalog>,
    trending: Option<Arc<TrendingAggregator>>,
    state: RwLock<ControllerState>,
    view_tx: watch::Sender<SearchView>,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn MovieCatalog>, trending: Option<Arc<TrendingAggregator>>) -> Self {
        let (view_tx, _) = watch::channel(SearchView::default());
        Self {
            catalog,
            trending,
            state: RwLock::new(ControllerState::default()),
            view_tx,
        }
    }

    /// Whether searches are counted towards a trending ranking.
    pub fn has_trending(&self) -> bool {
        self.trending.is_some()
    }

    /// Record the raw input for display. Does not fetch.
    pub async fn set_input(&self, term: &str) {
        let mut state = self.state.write().await;
        state.search_term = term.to_string();
        self.publish(&state);
    }

    /// Accept a settled term, beginning a fetch unless it equals the term
    /// of the latest fetch.
    pub async fn settle(&self, term: String) -> Option<FetchTicket> {
        {
            let state = self.state.read().await;
            if state.debounced_term.as_deref() == Some(term.as_str()) {
                debug!("Settled term '{}' unchanged, not refetching", term);
                return None;
            }
        }
        Some(self.begin(term).await)
    }

    /// Enter `Loading` for `term` and make it the latest request.
    pub async fn begin(&self, term: String) -> FetchTicket {
        let mut state = self.state.write().await;
        state.last_issued += 1;
        state.debounced_term = Some(term.clone());
        state.fetch = FetchState::Loading;
        self.publish(&state);

        let ticket = FetchTicket {
            id: state.last_issued,
            term,
        };
        debug!(
            "Fetch #{} started: mode={}, term='{}'",
            ticket.id,
            ticket.mode().as_str(),
            ticket.term
        );
        ticket
    }

    /// Apply a fetch outcome if `ticket` is still the latest request.
    pub async fn resolve(
        &self,
        ticket: &FetchTicket,
        outcome: Result<CatalogPage, CatalogError>,
    ) -> Resolution {
        let mut state = self.state.write().await;
        if ticket.id != state.last_issued {
            STALE_RESPONSES.inc();
            debug!(
                "Dropping stale response #{} for '{}' (latest is #{})",
                ticket.id, ticket.term, state.last_issued
            );
            return Resolution::Stale;
        }

        let mut representative = None;
        state.fetch = match outcome {
            Ok(page) if page.is_empty() => FetchState::RenderedEmpty,
            Ok(page) => {
                if !ticket.term.is_empty() {
                    representative = page.first().cloned();
                }
                FetchState::Rendered(page.results)
            }
            Err(e) => {
                error!("Error fetching movies for '{}': {}", ticket.term, e);
                FetchState::Failed(failure_message(&e))
            }
        };
        self.publish(&state);

        Resolution::Applied {
            state: state.fetch.tag(),
            representative,
        }
    }

    /// Run the catalog call for `ticket`, apply it, and count the search
    /// as trending when it produced a representative movie.
    pub async fn complete(&self, ticket: FetchTicket) -> Resolution {
        let outcome = self.catalog.fetch(&ticket.term).await;
        let resolution = self.resolve(&ticket, outcome).await;

        if let Resolution::Applied {
            representative: Some(movie),
            ..
        } = &resolution
        {
            if let Some(trending) = &self.trending {
                trending.record_search(&ticket.term, movie).await;
            }
        }

        resolution
    }

    /// Begin and complete a fetch for `term`.
    pub async fn run_fetch(&self, term: String) -> Resolution {
        let ticket = self.begin(term).await;
        self.complete(ticket).await
    }

    /// Replace the trending ranking shown alongside results.
    pub async fn set_trending(&self, records: Vec<TrendingRecord>) {
        let mut state = self.state.write().await;
        state.trending = records;
        self.publish(&state);
    }

    /// Re-read the ranking from the store.
    ///
    /// Returns `None` without a trending store or when the store fails; the
    /// ranking already shown is left as it was.
    pub async fn refresh_trending(&self) -> Option<Vec<TrendingRecord>> {
        let trending = self.trending.as_ref()?;

        let records = trending.load_ranking().await?;
        info!("Trending ranking loaded ({} entries)", records.len());
        self.set_trending(records.clone()).await;
        Some(records)
    }

    pub async fn snapshot(&self) -> SearchView {
        self.state.read().await.view()
    }

    pub async fn fetch_state(&self) -> FetchState {
        self.state.read().await.fetch.clone()
    }

    pub async fn trending(&self) -> Vec<TrendingRecord> {
        self.state.read().await.trending.clone()
    }

    /// Receive a new [`SearchView`] on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.view_tx.subscribe()
    }

    fn publish(&self, state: &ControllerState) {
        self.view_tx.send_replace(state.view());
    }
}

fn failure_message(error: &CatalogError) -> String {
    match error {
        CatalogError::Upstream { message } => message
            .clone()
            .unwrap_or_else(|| UPSTREAM_FALLBACK_MESSAGE.to_string()),
        _ => FETCH_ERROR_MESSAGE.to_string(),
    }
}
