pub mod catalog;
pub mod config;
pub mod debounce;
pub mod metrics;
pub mod pipeline;
pub mod testing;
pub mod trending;

pub use catalog::{CatalogError, CatalogPage, MovieCatalog, MovieSummary, SearchMode, TmdbCatalogClient};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    TrendingBackend,
};
pub use debounce::Debouncer;
pub use pipeline::{FetchState, SearchController, SearchPipeline, SearchView};
pub use trending::{
    AppwriteTrendingStore, SqliteTrendingStore, TrendingAggregator, TrendingRecord, TrendingStore,
    TrendingStoreError,
};
