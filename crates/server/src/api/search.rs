//! Search input and current view.

use axum::{extract::State, Json};
use moviefinder_core::SearchView;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::metrics::SEARCH_INPUTS_TOTAL;
use crate::state::AppState;

/// Request body for an input change.
#[derive(Debug, Deserialize)]
pub struct SearchInputRequest {
    /// Full input value, exactly as typed.
    #[serde(default)]
    pub term: String,
}

/// PUT /search/input
///
/// Records the new input and restarts the quiet period. The returned view
/// reflects the input immediately; results follow once the term settles.
pub async fn put_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchInputRequest>,
) -> Json<SearchView> {
    debug!("Search input changed: {:?}", request.term);
    SEARCH_INPUTS_TOTAL.inc();

    state.pipeline().input(request.term).await;
    Json(state.controller().snapshot().await)
}

/// GET /search
pub async fn get_search(State(state): State<Arc<AppState>>) -> Json<SearchView> {
    Json(state.controller().snapshot().await)
}
