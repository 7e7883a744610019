use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub trending: TrendingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Movie catalog (TMDB) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Bearer token sent with every catalog request.
    #[serde(default)]
    pub api_key: String,
    /// API base URL (default: https://api.themoviedb.org/3).
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// Image base URL used to build poster links.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_catalog_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Search pipeline tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Quiet period before typed input is searched (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Number of trending entries shown.
    #[serde(default = "default_trending_limit")]
    pub trending_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            trending_limit: default_trending_limit(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_trending_limit() -> u32 {
    5
}

/// Trending store configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrendingConfig {
    #[serde(default)]
    pub backend: TrendingBackend,
    /// Appwrite-specific configuration (required when backend = "appwrite")
    #[serde(default)]
    pub appwrite: Option<AppwriteConfig>,
    /// SQLite-specific configuration (defaults used when absent)
    #[serde(default)]
    pub sqlite: Option<SqliteTrendingConfig>,
}

/// Available trending store backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendingBackend {
    Appwrite,
    Sqlite,
    #[default]
    None,
}

/// Appwrite document store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppwriteConfig {
    /// Appwrite endpoint (e.g., "https://cloud.appwrite.io/v1")
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    /// Server API key. Browser-style sessions work without one.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Local SQLite trending store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteTrendingConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for SqliteTrendingConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("trending.db")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub catalog: SanitizedCatalogConfig,
    pub search: SearchConfig,
    pub trending: SanitizedTrendingConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub base_url: String,
    pub image_base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTrendingConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appwrite: Option<SanitizedAppwriteConfig>,
}

/// Sanitized Appwrite config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.base_url.clone(),
                image_base_url: config.catalog.image_base_url.clone(),
                api_key_configured: !config.catalog.api_key.is_empty(),
                timeout_secs: config.catalog.timeout_secs,
            },
            search: config.search.clone(),
            trending: SanitizedTrendingConfig {
                backend: match config.trending.backend {
                    TrendingBackend::Appwrite => "appwrite".to_string(),
                    TrendingBackend::Sqlite => "sqlite".to_string(),
                    TrendingBackend::None => "none".to_string(),
                },
                appwrite: config
                    .trending
                    .appwrite
                    .as_ref()
                    .map(|a| SanitizedAppwriteConfig {
                        endpoint: a.endpoint.clone(),
                        project_id: a.project_id.clone(),
                        database_id: a.database_id.clone(),
                        collection_id: a.collection_id.clone(),
                        api_key_configured: a.api_key.as_deref().is_some_and(|k| !k.is_empty()),
                    }),
            },
        }
    }
}
