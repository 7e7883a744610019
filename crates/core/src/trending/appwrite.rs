//! Appwrite document store backend.
//!
//! Records live as documents in one collection with the attributes
//! `searchTerm`, `count`, `movie_id`, `title` and `poster_url`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{NewTrendingRecord, TrendingRecord, TrendingStore, TrendingStoreError};
use crate::config::AppwriteConfig;

/// Trending store backed by an Appwrite collection.
pub struct AppwriteTrendingStore {
    client: Client,
    endpoint: String,
    project_id: String,
    database_id: String,
    collection_id: String,
    api_key: Option<String>,
}

impl AppwriteTrendingStore {
    /// Create a new Appwrite store client.
    pub fn new(config: &AppwriteConfig) -> Result<Self, TrendingStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            collection_id: config.collection_id.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint,
            urlencoding::encode(&self.database_id),
            urlencoding::encode(&self.collection_id)
        )
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.documents_url(), urlencoding::encode(id))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header("X-Appwrite-Project", &self.project_id);
        if let Some(key) = &self.api_key {
            request = request.header("X-Appwrite-Key", key);
        }
        request
    }

    /// List documents matching the given queries.
    async fn list(&self, queries: &[String]) -> Result<Vec<TrendingRecord>, TrendingStoreError> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();

        let response = self
            .request(Method::GET, &self.documents_url())
            .query(&params)
            .send()
            .await?;

        let list: AppwriteDocumentList = parse_response(response).await?;
        Ok(list.documents.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TrendingStore for AppwriteTrendingStore {
    fn name(&self) -> &'static str {
        "appwrite"
    }

    async fn find_by_term(&self, term: &str) -> Result<Option<TrendingRecord>, TrendingStoreError> {
        debug!("Appwrite find trending record: term='{}'", term);
        let records = self
            .list(&[query_equal("searchTerm", term), query_limit(1)])
            .await?;
        Ok(records.into_iter().next())
    }

    async fn create(&self, record: NewTrendingRecord) -> Result<TrendingRecord, TrendingStoreError> {
        debug!("Appwrite create trending record: term='{}'", record.search_term);
        let body = json!({
            "documentId": "unique()",
            "data": {
                "searchTerm": record.search_term,
                "count": 1,
                "movie_id": record.movie_id,
                "title": record.title,
                "poster_url": record.poster_url,
            }
        });

        let response = self
            .request(Method::POST, &self.documents_url())
            .json(&body)
            .send()
            .await?;

        if response.status().as_u16() == 409 {
            return Err(TrendingStoreError::Conflict(record.search_term));
        }

        let document: AppwriteDocument = parse_response(response).await?;
        Ok(document.into())
    }

    async fn increment(&self, record: &TrendingRecord) -> Result<TrendingRecord, TrendingStoreError> {
        let next = record.count + 1;
        debug!(
            "Appwrite increment trending record: id={}, count {} -> {}",
            record.id, record.count, next
        );

        let response = self
            .request(Method::PATCH, &self.document_url(&record.id))
            .json(&json!({ "data": { "count": next } }))
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(TrendingStoreError::NotFound(record.id.clone()));
        }

        let document: AppwriteDocument = parse_response(response).await?;
        Ok(document.into())
    }

    async fn top(&self, limit: u32) -> Result<Vec<TrendingRecord>, TrendingStoreError> {
        debug!("Appwrite load trending: limit={}", limit);
        self.list(&[query_limit(limit), query_order_desc("count")])
            .await
    }
}

// ============================================================================
// Query builders (Appwrite JSON query syntax)
// ============================================================================

fn query_equal(attribute: &str, value: &str) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

fn query_limit(limit: u32) -> String {
    json!({ "method": "limit", "values": [limit] }).to_string()
}

fn query_order_desc(attribute: &str) -> String {
    json!({ "method": "orderDesc", "attribute": attribute }).to_string()
}

// ============================================================================
// Appwrite API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct AppwriteDocumentList {
    #[serde(default)]
    documents: Vec<AppwriteDocument>,
}

#[derive(Debug, Deserialize)]
struct AppwriteDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "searchTerm")]
    search_term: String,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    movie_id: Option<u64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppwriteErrorBody {
    #[serde(default)]
    message: String,
}

impl From<AppwriteDocument> for TrendingRecord {
    fn from(d: AppwriteDocument) -> Self {
        Self {
            id: d.id,
            search_term: d.search_term,
            count: d.count,
            movie_id: d.movie_id,
            title: d.title.unwrap_or_default(),
            poster_url: d.poster_url.filter(|p| !p.is_empty()),
        }
    }
}

async fn parse_response<T: for<'de> Deserialize<'de>>(
    response: Response,
) -> Result<T, TrendingStoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AppwriteErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        return Err(TrendingStoreError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| TrendingStoreError::Parse(format!("Failed to parse Appwrite response: {}", e)))
}
