//! TMDB (The Movie Database) catalog client.
//!
//! Authenticates with a v4 read access token sent as a bearer header.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::types::{CatalogPage, MovieSummary, SearchMode};
use super::{CatalogError, MovieCatalog};
use crate::config::CatalogConfig;
use crate::metrics::{CATALOG_REQUESTS, CATALOG_REQUEST_DURATION};

/// TMDB catalog client.
pub struct TmdbCatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbCatalogClient {
    /// Create a new TMDB client. Fails if no API key is configured.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "catalog API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn discover_url(&self) -> String {
        format!("{}/discover/movie?sort_by=popularity.desc", self.base_url)
    }

    fn search_url(&self, term: &str) -> String {
        format!(
            "{}/search/movie?query={}",
            self.base_url,
            urlencoding::encode(term)
        )
    }

    /// Issue one request and record its outcome.
    async fn get_page(&self, url: &str, mode: SearchMode) -> Result<CatalogPage, CatalogError> {
        let started = Instant::now();
        let result = self.request(url).await;

        CATALOG_REQUEST_DURATION
            .with_label_values(&[mode.as_str()])
            .observe(started.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(page) if page.is_empty() => "empty",
            Ok(_) => "success",
            Err(_) => "error",
        };
        CATALOG_REQUESTS
            .with_label_values(&[mode.as_str(), outcome])
            .inc();

        result
    }

    async fn request(&self, url: &str) -> Result<CatalogPage, CatalogError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Catalog request failed with HTTP {}: {}", status.as_u16(), body);
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let body: TmdbListResponse = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse movie list response: {}", e))
        })?;

        body.into_page()
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalogClient {
    async fn discover(&self) -> Result<CatalogPage, CatalogError> {
        debug!("TMDB discover");
        self.get_page(&self.discover_url(), SearchMode::Discover)
            .await
    }

    async fn search(&self, term: &str) -> Result<CatalogPage, CatalogError> {
        debug!("TMDB movie search: query='{}'", term);
        self.get_page(&self.search_url(term), SearchMode::Search)
            .await
    }
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TmdbListResponse {
    #[serde(default)]
    results: Option<Vec<MovieSummary>>,
    /// Failure flag some catalog proxies add; TMDB itself never sends it.
    #[serde(default)]
    response: Option<bool>,
    #[serde(default, rename = "Error")]
    error: Option<String>,
}

impl TmdbListResponse {
    fn into_page(self) -> Result<CatalogPage, CatalogError> {
        if self.response == Some(false) {
            return Err(CatalogError::Upstream {
                message: self.error.filter(|m| !m.is_empty()),
            });
        }
        Ok(CatalogPage::new(self.results.unwrap_or_default()))
    }
}
