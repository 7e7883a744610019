//! Testing utilities and mock implementations.
//!
//! Mocks for the catalog and trending store traits, so the pipeline and the
//! server can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use moviefinder_core::testing::{MockMovieCatalog, MockTrendingStore, fixtures};
//!
//! let catalog = MockMovieCatalog::new();
//! let store = MockTrendingStore::new();
//!
//! // Configure mock responses
//! catalog.set_results("dune", vec![fixtures::movie(438631, "Dune")]).await;
//! store.insert(fixtures::trending_record("alien", 3)).await;
//!
//! // Use in SearchController...
//! ```

mod mock_catalog;
mod mock_trending_store;

pub use mock_catalog::{MockMovieCatalog, RecordedCatalogQuery};
pub use mock_trending_store::{MockTrendingStore, RecordedStoreCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::MovieSummary;
    use crate::trending::TrendingRecord;

    /// Image base used by fixtures and test aggregators.
    pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

    /// Create a movie with reasonable defaults. The poster path is `/{id}.jpg`.
    pub fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/{}.jpg", id)),
            popularity: Some(50.0),
            original_language: Some("en".to_string()),
            release_date: Some("2021-10-22".to_string()),
            vote_average: Some(7.5),
        }
    }

    /// Create a trending record with an id derived from the term.
    pub fn trending_record(term: &str, count: u64) -> TrendingRecord {
        TrendingRecord {
            id: format!("rec-{}", term),
            search_term: term.to_string(),
            count,
            movie_id: Some(1),
            title: format!("{} (movie)", term),
            poster_url: Some(format!("{}/{}.jpg", IMAGE_BASE_URL, term)),
        }
    }
}
