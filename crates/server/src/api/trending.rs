//! Trending ranking endpoints.

use axum::{extract::State, http::StatusCode, Json};
use moviefinder_core::TrendingRecord;
use serde::Serialize;
use std::sync::Arc;

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// A ranked trending entry.
#[derive(Debug, Serialize)]
pub struct TrendingEntry {
    /// 1-based position in the ranking.
    pub rank: usize,
    #[serde(flatten)]
    pub record: TrendingRecord,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub entries: Vec<TrendingEntry>,
}

impl From<Vec<TrendingRecord>> for TrendingResponse {
    fn from(records: Vec<TrendingRecord>) -> Self {
        Self {
            entries: records
                .into_iter()
                .enumerate()
                .map(|(i, record)| TrendingEntry {
                    rank: i + 1,
                    record,
                })
                .collect(),
        }
    }
}

/// GET /trending
pub async fn get_trending(State(state): State<Arc<AppState>>) -> Json<TrendingResponse> {
    Json(state.controller().trending().await.into())
}

/// POST /trending/refresh
///
/// A store failure answers 502 and leaves the shown ranking untouched.
pub async fn refresh_trending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TrendingResponse>, (StatusCode, Json<ErrorResponse>)> {
    let controller = state.controller();
    if !controller.has_trending() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Trending store not configured".to_string(),
            }),
        ));
    }

    match controller.refresh_trending().await {
        Some(records) => Ok(Json(records.into())),
        None => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Failed to load trending ranking".to_string(),
            }),
        )),
    }
}
