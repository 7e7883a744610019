//! Render state owned by the search controller.

use serde::{Deserialize, Serialize};

use crate::catalog::MovieSummary;
use crate::trending::TrendingRecord;

/// Shown for transport, status and parse failures.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching movies. Please try again later.";

/// Shown when the catalog flags a failure without a message.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Failed to fetch movies";

/// State of the most recent fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    /// No fetch has started yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The catalog returned at least one movie.
    Rendered(Vec<MovieSummary>),
    /// The catalog returned no movies.
    RenderedEmpty,
    /// The fetch failed; the message is user-facing.
    Failed(String),
}

impl FetchState {
    pub fn tag(&self) -> FetchStateTag {
        match self {
            FetchState::Idle => FetchStateTag::Idle,
            FetchState::Loading => FetchStateTag::Loading,
            FetchState::Rendered(_) => FetchStateTag::Rendered,
            FetchState::RenderedEmpty => FetchStateTag::RenderedEmpty,
            FetchState::Failed(_) => FetchStateTag::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchState::Rendered(_) | FetchState::RenderedEmpty | FetchState::Failed(_)
        )
    }

    pub fn movies(&self) -> &[MovieSummary] {
        match self {
            FetchState::Rendered(movies) => movies,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Fieldless discriminant of [`FetchState`], for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStateTag {
    Idle,
    Loading,
    Rendered,
    RenderedEmpty,
    Failed,
}

/// Serializable snapshot of everything a presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchView {
    /// Raw input as last typed.
    pub search_term: String,
    /// Term of the latest fetch, once one has started.
    pub debounced_term: Option<String>,
    pub state: FetchStateTag,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub movies: Vec<MovieSummary>,
    pub trending: Vec<TrendingRecord>,
}

impl SearchView {
    pub(crate) fn new(
        search_term: &str,
        debounced_term: Option<&str>,
        fetch: &FetchState,
        trending: &[TrendingRecord],
    ) -> Self {
        Self {
            search_term: search_term.to_string(),
            debounced_term: debounced_term.map(String::from),
            state: fetch.tag(),
            is_loading: fetch.is_loading(),
            error_message: fetch.error_message().map(String::from),
            movies: fetch.movies().to_vec(),
            trending: trending.to_vec(),
        }
    }
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new("", None, &FetchState::Idle, &[])
    }
}
