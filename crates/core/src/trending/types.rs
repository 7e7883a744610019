//! Types for the trending search ranking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MovieSummary;

/// Per-term search counter as kept by the trending store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingRecord {
    /// Store-assigned identifier, stable across reads.
    pub id: String,
    /// Exact search term this record counts.
    pub search_term: String,
    /// Number of successful non-empty searches for the term.
    pub count: u64,
    /// Catalog ID of the representative movie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<u64>,
    /// Title of the representative movie.
    pub title: String,
    /// Poster of the representative movie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

/// A record to create on the first search of a term. Always starts at count 1.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrendingRecord {
    pub search_term: String,
    pub movie_id: Option<u64>,
    pub title: String,
    pub poster_url: Option<String>,
}

impl NewTrendingRecord {
    /// Build a record for `term` represented by the top search result.
    pub fn from_movie(term: &str, movie: &MovieSummary, image_base_url: &str) -> Self {
        Self {
            search_term: term.to_string(),
            movie_id: Some(movie.id),
            title: movie.title.clone(),
            poster_url: movie.poster_url(image_base_url),
        }
    }
}

/// Errors from trending store backends.
#[derive(Debug, Error)]
pub enum TrendingStoreError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("Store error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// A record for the term already exists.
    #[error("Trending record already exists for '{0}'")]
    Conflict(String),

    /// Record not found.
    #[error("Trending record not found: {0}")]
    NotFound(String),
}
