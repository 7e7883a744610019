//! Mock trending store for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::trending::{NewTrendingRecord, TrendingRecord, TrendingStore, TrendingStoreError};

/// A recorded store call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedStoreCall {
    FindByTerm { term: String },
    Create { search_term: String },
    Increment { id: String, from: u64 },
    Top { limit: u32 },
}

/// In-memory implementation of the TrendingStore trait.
///
/// Search terms are unique, like the real backends: a second create for the
/// same term fails with [`TrendingStoreError::Conflict`]. An optional read
/// latency holds `find_by_term` after it has read, so concurrent callers
/// interleave between read and write.
#[derive(Debug)]
pub struct MockTrendingStore {
    records: Arc<RwLock<Vec<TrendingRecord>>>,
    calls: Arc<RwLock<Vec<RecordedStoreCall>>>,
    read_latency: Arc<RwLock<Option<Duration>>>,
    next_id: Arc<RwLock<u64>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TrendingStoreError>>>,
}

impl Default for MockTrendingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTrendingStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            read_latency: Arc::new(RwLock::new(None)),
            next_id: Arc::new(RwLock::new(1)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Seed a record directly, bypassing call recording.
    pub async fn insert(&self, record: TrendingRecord) {
        self.records.write().await.push(record);
    }

    /// All stored records.
    pub async fn records(&self) -> Vec<TrendingRecord> {
        self.records.read().await.clone()
    }

    /// The stored record for `term`, if any.
    pub async fn record_for(&self, term: &str) -> Option<TrendingRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.search_term == term)
            .cloned()
    }

    /// Delay every `find_by_term` after it has read.
    pub async fn set_read_latency(&self, latency: Duration) {
        *self.read_latency.write().await = Some(latency);
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TrendingStoreError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedStoreCall> {
        self.calls.read().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Number of create and increment calls.
    pub async fn write_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    RecordedStoreCall::Create { .. } | RecordedStoreCall::Increment { .. }
                )
            })
            .count()
    }

    async fn take_error(&self) -> Option<TrendingStoreError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedStoreCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl TrendingStore for MockTrendingStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn find_by_term(&self, term: &str) -> Result<Option<TrendingRecord>, TrendingStoreError> {
        self.record(RecordedStoreCall::FindByTerm {
            term: term.to_string(),
        })
        .await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let found = self.record_for(term).await;

        let latency = *self.read_latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        Ok(found)
    }

    async fn create(&self, record: NewTrendingRecord) -> Result<TrendingRecord, TrendingStoreError> {
        self.record(RecordedStoreCall::Create {
            search_term: record.search_term.clone(),
        })
        .await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut records = self.records.write().await;
        if records.iter().any(|r| r.search_term == record.search_term) {
            return Err(TrendingStoreError::Conflict(record.search_term));
        }

        let mut next_id = self.next_id.write().await;
        let created = TrendingRecord {
            id: format!("doc-{}", *next_id),
            search_term: record.search_term,
            count: 1,
            movie_id: record.movie_id,
            title: record.title,
            poster_url: record.poster_url,
        };
        *next_id += 1;
        records.push(created.clone());
        Ok(created)
    }

    async fn increment(&self, record: &TrendingRecord) -> Result<TrendingRecord, TrendingStoreError> {
        self.record(RecordedStoreCall::Increment {
            id: record.id.clone(),
            from: record.count,
        })
        .await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut records = self.records.write().await;
        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| TrendingStoreError::NotFound(record.id.clone()))?;
        stored.count = record.count + 1;
        Ok(stored.clone())
    }

    async fn top(&self, limit: u32) -> Result<Vec<TrendingRecord>, TrendingStoreError> {
        self.record(RecordedStoreCall::Top { limit }).await;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.count.cmp(&a.count));
        records.truncate(limit as usize);
        Ok(records)
    }
}
