//! Trending searches.
//!
//! Every successful non-empty search bumps a per-term counter in a shared
//! document store; the top counters form the trending ranking.
//!
//! Updating a counter is a read followed by a write with no locking, so two
//! clients searching the same term at the same moment can both read `N` and
//! both write `N + 1`. The lost increment is accepted: the ranking is
//! best-effort analytics.

mod aggregator;
mod appwrite;
mod sqlite;
mod types;

pub use aggregator::TrendingAggregator;
pub use appwrite::AppwriteTrendingStore;
pub use sqlite::SqliteTrendingStore;
pub use types::*;

use async_trait::async_trait;

/// Trait for trending store backends.
#[async_trait]
pub trait TrendingStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Find the record whose search term matches `term` exactly.
    async fn find_by_term(&self, term: &str) -> Result<Option<TrendingRecord>, TrendingStoreError>;

    /// Create a record with count 1.
    async fn create(&self, record: NewTrendingRecord) -> Result<TrendingRecord, TrendingStoreError>;

    /// Write `record.count + 1` as the record's count.
    ///
    /// The new value is computed from the count read earlier, not by the
    /// store, which is what makes concurrent increments lossy.
    async fn increment(&self, record: &TrendingRecord) -> Result<TrendingRecord, TrendingStoreError>;

    /// Records ordered by count descending, at most `limit`.
    async fn top(&self, limit: u32) -> Result<Vec<TrendingRecord>, TrendingStoreError>;
}
