//! Movie catalog client.
//!
//! The catalog answers two query shapes: a popularity-sorted discover listing
//! (used for the empty term) and free-text search. Calls are single attempts;
//! nothing is retried or cached.

mod tmdb;
mod types;

pub use tmdb::TmdbCatalogClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network failure reaching the catalog.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned HTTP {status}")]
    Status { status: u16 },

    /// The catalog answered but flagged the request as failed.
    #[error("Catalog reported failure: {}", message.as_deref().unwrap_or("no message"))]
    Upstream { message: Option<String> },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    /// Whether the failure happened before a usable payload was received.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Transport(_) | CatalogError::Status { .. } | CatalogError::Parse(_)
        )
    }
}

/// Trait for movie catalog backends.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Popularity-sorted default listing.
    async fn discover(&self) -> Result<CatalogPage, CatalogError>;

    /// Movies matching a free-text term.
    async fn search(&self, term: &str) -> Result<CatalogPage, CatalogError>;

    /// Dispatch on the term: empty discovers, anything else searches.
    async fn fetch(&self, term: &str) -> Result<CatalogPage, CatalogError> {
        match SearchMode::for_term(term) {
            SearchMode::Discover => self.discover().await,
            SearchMode::Search => self.search(term).await,
        }
    }
}
