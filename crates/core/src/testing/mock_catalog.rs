//! Mock movie catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, CatalogPage, MovieCatalog, MovieSummary};

/// A recorded catalog query for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCatalogQuery {
    Discover,
    Search { term: String },
}

/// Mock implementation of the MovieCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable results per search term
/// - Track queries for assertions
/// - Simulate failures and per-term latency
///
/// # Example
///
/// ```rust,ignore
/// use moviefinder_core::testing::{MockMovieCatalog, fixtures};
///
/// let catalog = MockMovieCatalog::new();
/// catalog.set_results("alien", vec![fixtures::movie(348, "Alien")]).await;
/// catalog.set_delay("alien", Duration::from_millis(200)).await;
///
/// let page = catalog.search("alien").await?;
/// assert_eq!(page.results.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockMovieCatalog {
    /// Results for the empty term.
    discover_results: Arc<RwLock<Vec<MovieSummary>>>,
    /// Results by exact search term. Unknown terms return no results.
    results: Arc<RwLock<HashMap<String, Vec<MovieSummary>>>>,
    /// Simulated latency by term ("" for discover).
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Terms that always fail with the given HTTP status.
    failing: Arc<RwLock<HashMap<String, u16>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl Default for MockMovieCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMovieCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            discover_results: Arc::new(RwLock::new(Vec::new())),
            results: Arc::new(RwLock::new(HashMap::new())),
            delays: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashMap::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the popularity listing returned for the empty term.
    pub async fn set_discover_results(&self, movies: Vec<MovieSummary>) {
        *self.discover_results.write().await = movies;
    }

    /// Set the results returned for an exact search term.
    pub async fn set_results(&self, term: &str, movies: Vec<MovieSummary>) {
        self.results.write().await.insert(term.to_string(), movies);
    }

    /// Delay the response for `term` ("" delays discover).
    pub async fn set_delay(&self, term: &str, delay: Duration) {
        self.delays.write().await.insert(term.to_string(), delay);
    }

    /// Make every query for `term` fail with an HTTP status.
    pub async fn fail_with_status(&self, term: &str, status: u16) {
        self.failing.write().await.insert(term.to_string(), status);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Clear recorded queries.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Number of free-text searches for `term`.
    pub async fn search_count(&self, term: &str) -> usize {
        self.queries
            .read()
            .await
            .iter()
            .filter(|q| matches!(q, RecordedCatalogQuery::Search { term: t } if t == term))
            .count()
    }

    async fn respond(&self, term: &str) -> Result<CatalogPage, CatalogError> {
        let delay = self.delays.read().await.get(term).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(status) = self.failing.read().await.get(term) {
            return Err(CatalogError::Status { status: *status });
        }

        let movies = if term.is_empty() {
            self.discover_results.read().await.clone()
        } else {
            self.results
                .read()
                .await
                .get(term)
                .cloned()
                .unwrap_or_default()
        };
        Ok(CatalogPage::new(movies))
    }
}

#[async_trait]
impl MovieCatalog for MockMovieCatalog {
    async fn discover(&self) -> Result<CatalogPage, CatalogError> {
        self.queries
            .write()
            .await
            .push(RecordedCatalogQuery::Discover);
        self.respond("").await
    }

    async fn search(&self, term: &str) -> Result<CatalogPage, CatalogError> {
        self.queries.write().await.push(RecordedCatalogQuery::Search {
            term: term.to_string(),
        });
        self.respond(term).await
    }
}
