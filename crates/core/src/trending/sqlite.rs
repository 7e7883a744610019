//! SQLite-backed trending store.
//!
//! Useful for single-node deployments and local development. The same
//! read-then-write protocol as the remote store applies; `search_term` is
//! unique, so a racing second create fails with a conflict instead of
//! producing a duplicate row.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use super::{NewTrendingRecord, TrendingRecord, TrendingStore, TrendingStoreError};

/// SQLite-backed trending store.
pub struct SqliteTrendingStore {
    conn: Mutex<Connection>,
}

impl SqliteTrendingStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TrendingStoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, TrendingStoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TrendingStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS trending_searches (
                id TEXT PRIMARY KEY,
                search_term TEXT NOT NULL UNIQUE,
                count INTEGER NOT NULL DEFAULT 1,
                movie_id INTEGER,
                title TEXT NOT NULL,
                poster_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_trending_searches_count ON trending_searches(count DESC);
            "#,
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, TrendingStoreError> {
        self.conn
            .lock()
            .map_err(|e| TrendingStoreError::Database(format!("Lock poisoned: {}", e)))
    }

    fn get_by_id(conn: &Connection, id: &str) -> Result<TrendingRecord, TrendingStoreError> {
        conn.query_row(
            "SELECT id, search_term, count, movie_id, title, poster_url
             FROM trending_searches WHERE id = ?",
            params![id],
            row_to_record,
        )
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| TrendingStoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl TrendingStore for SqliteTrendingStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn find_by_term(&self, term: &str) -> Result<Option<TrendingRecord>, TrendingStoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, search_term, count, movie_id, title, poster_url
             FROM trending_searches WHERE search_term = ?",
            params![term],
            row_to_record,
        )
        .optional()
        .map_err(db_err)
    }

    async fn create(&self, record: NewTrendingRecord) -> Result<TrendingRecord, TrendingStoreError> {
        let conn = self.lock()?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let inserted = conn.execute(
            "INSERT INTO trending_searches
                (id, search_term, count, movie_id, title, poster_url, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6, ?6)",
            params![
                id,
                record.search_term,
                record.movie_id.map(|m| m as i64),
                record.title,
                record.poster_url,
                now
            ],
        );

        match inserted {
            Ok(_) => Self::get_by_id(&conn, &id),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(TrendingStoreError::Conflict(record.search_term))
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn increment(&self, record: &TrendingRecord) -> Result<TrendingRecord, TrendingStoreError> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE trending_searches SET count = ?1, updated_at = ?2 WHERE id = ?3",
                params![(record.count + 1) as i64, Utc::now().to_rfc3339(), record.id],
            )
            .map_err(db_err)?;

        if updated == 0 {
            return Err(TrendingStoreError::NotFound(record.id.clone()));
        }

        Self::get_by_id(&conn, &record.id)
    }

    async fn top(&self, limit: u32) -> Result<Vec<TrendingRecord>, TrendingStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, search_term, count, movie_id, title, poster_url
                 FROM trending_searches
                 ORDER BY count DESC, updated_at DESC
                 LIMIT ?",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![limit as i64], row_to_record)
            .map_err(db_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(db_err)?);
        }
        Ok(records)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TrendingRecord> {
    let count: i64 = row.get(2)?;
    let movie_id: Option<i64> = row.get(3)?;
    Ok(TrendingRecord {
        id: row.get(0)?,
        search_term: row.get(1)?,
        count: count.max(0) as u64,
        movie_id: movie_id.map(|m| m as u64),
        title: row.get(4)?,
        poster_url: row.get(5)?,
    })
}

fn db_err(e: rusqlite::Error) -> TrendingStoreError {
    TrendingStoreError::Database(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_record(term: &str, title: &str) -> NewTrendingRecord {
        NewTrendingRecord {
            search_term: term.to_string(),
            movie_id: Some(42),
            title: title.to_string(),
            poster_url: Some(format!("https://img/{}.jpg", term)),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = SqliteTrendingStore::in_memory().unwrap();

        assert!(store.find_by_term("dune").await.unwrap().is_none());

        let created = store.create(new_record("dune", "Dune")).await.unwrap();
        assert_eq!(created.count, 1);
        assert_eq!(created.search_term, "dune");
        assert_eq!(created.movie_id, Some(42));

        let found = store.find_by_term("dune").await.unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_find_is_exact_match() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        store.create(new_record("dune", "Dune")).await.unwrap();

        assert!(store.find_by_term("Dune").await.unwrap().is_none());
        assert!(store.find_by_term("dun").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_increment_keeps_representative() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        let created = store.create(new_record("dune", "Dune")).await.unwrap();

        let updated = store.increment(&created).await.unwrap();
        assert_eq!(updated.count, 2);
        assert_eq!(updated.title, "Dune");
        assert_eq!(updated.poster_url, created.poster_url);
    }

    #[tokio::test]
    async fn test_increment_from_stale_read_loses_update() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        let created = store.create(new_record("dune", "Dune")).await.unwrap();

        // Two clients both read count=1 and both write 2.
        store.increment(&created).await.unwrap();
        let second = store.increment(&created).await.unwrap();
        assert_eq!(second.count, 2);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        store.create(new_record("dune", "Dune")).await.unwrap();

        let result = store.create(new_record("dune", "Dune: Part Two")).await;
        assert!(matches!(result, Err(TrendingStoreError::Conflict(term)) if term == "dune"));
    }

    #[tokio::test]
    async fn test_increment_missing_record() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        let ghost = TrendingRecord {
            id: "missing".to_string(),
            search_term: "ghost".to_string(),
            count: 1,
            movie_id: None,
            title: "Ghost".to_string(),
            poster_url: None,
        };
        assert!(matches!(
            store.increment(&ghost).await,
            Err(TrendingStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_top_orders_by_count_and_limits() {
        let store = SqliteTrendingStore::in_memory().unwrap();
        for (term, bumps) in [("a", 0), ("b", 3), ("c", 1), ("d", 5), ("e", 2), ("f", 4)] {
            let mut record = store.create(new_record(term, term)).await.unwrap();
            for _ in 0..bumps {
                record = store.increment(&record).await.unwrap();
            }
        }

        let top = store.top(5).await.unwrap();
        let terms: Vec<&str> = top.iter().map(|r| r.search_term.as_str()).collect();
        assert_eq!(terms, vec!["d", "f", "b", "e", "c"]);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[tokio::test]
    async fn test_persists_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trending.db");

        {
            let store = SqliteTrendingStore::new(&path).unwrap();
            store.create(new_record("dune", "Dune")).await.unwrap();
        }

        let store = SqliteTrendingStore::new(&path).unwrap();
        let found = store.find_by_term("dune").await.unwrap().unwrap();
        assert_eq!(found.count, 1);
    }
}
