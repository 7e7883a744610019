//! Trending aggregator: counts successful searches and reads the ranking.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::{NewTrendingRecord, TrendingRecord, TrendingStore};
use crate::catalog::MovieSummary;
use crate::metrics::TRENDING_OPERATIONS;

/// Records searches in a [`TrendingStore`] and loads the top terms.
///
/// Store failures never reach the caller. They are logged and counted, and
/// the search that triggered them is unaffected.
pub struct TrendingAggregator {
    store: Arc<dyn TrendingStore>,
    image_base_url: String,
    limit: u32,
}

impl TrendingAggregator {
    pub fn new(store: Arc<dyn TrendingStore>, image_base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            store,
            image_base_url: image_base_url.into(),
            limit,
        }
    }

    /// Name of the backing store.
    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Count one successful search for `term`, represented by `movie`.
    ///
    /// An existing record keeps its representative movie; only the count
    /// changes. Empty terms are never counted.
    pub async fn record_search(&self, term: &str, movie: &MovieSummary) {
        if term.is_empty() {
            debug!("Skipping trending update for empty term");
            return;
        }

        let existing = match self.store.find_by_term(term).await {
            Ok(existing) => existing,
            Err(e) => {
                TRENDING_OPERATIONS.with_label_values(&["find", "error"]).inc();
                error!("Failed to look up trending record for '{}': {}", term, e);
                return;
            }
        };

        match existing {
            Some(record) => match self.store.increment(&record).await {
                Ok(updated) => {
                    TRENDING_OPERATIONS.with_label_values(&["increment", "success"]).inc();
                    debug!(
                        "Trending count for '{}' is now {}",
                        updated.search_term, updated.count
                    );
                }
                Err(e) => {
                    TRENDING_OPERATIONS.with_label_values(&["increment", "error"]).inc();
                    error!("Failed to increment trending count for '{}': {}", term, e);
                }
            },
            None => {
                let new_record = NewTrendingRecord::from_movie(term, movie, &self.image_base_url);
                match self.store.create(new_record).await {
                    Ok(created) => {
                        TRENDING_OPERATIONS.with_label_values(&["create", "success"]).inc();
                        info!(
                            "Started trending record for '{}' (representative: '{}')",
                            created.search_term, created.title
                        );
                    }
                    Err(e) => {
                        TRENDING_OPERATIONS.with_label_values(&["create", "error"]).inc();
                        error!("Failed to create trending record for '{}': {}", term, e);
                    }
                }
            }
        }
    }

    /// Top records by count, highest first.
    ///
    /// `None` if the store failed, so callers can keep what they already
    /// show instead of mistaking an outage for an empty ranking.
    pub async fn load_ranking(&self) -> Option<Vec<TrendingRecord>> {
        match self.store.top(self.limit).await {
            Ok(mut records) => {
                TRENDING_OPERATIONS.with_label_values(&["load", "success"]).inc();
                records.sort_by(|a, b| b.count.cmp(&a.count));
                records.truncate(self.limit as usize);
                debug!(
                    "Loaded {} trending records from {}",
                    records.len(),
                    self.store.name()
                );
                Some(records)
            }
            Err(e) => {
                TRENDING_OPERATIONS.with_label_values(&["load", "error"]).inc();
                error!("Failed to load trending searches: {}", e);
                None
            }
        }
    }
}
