use super::{types::Config, ConfigError, TrendingBackend};

/// Validate configuration
/// Currently validates:
/// - Catalog bearer token is present (requests are never sent unauthenticated)
/// - Server port is not 0
/// - Debounce interval and trending limit are non-zero
/// - Appwrite backend has its section
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key is required (set it in the config file or MOVIEFINDER_CATALOG__API_KEY)"
                .to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.search.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "search.debounce_ms cannot be 0".to_string(),
        ));
    }

    if config.search.trending_limit == 0 {
        return Err(ConfigError::ValidationError(
            "search.trending_limit cannot be 0".to_string(),
        ));
    }

    if config.trending.backend == TrendingBackend::Appwrite && config.trending.appwrite.is_none() {
        return Err(ConfigError::ValidationError(
            "trending.backend = \"appwrite\" requires a [trending.appwrite] section".to_string(),
        ));
    }

    Ok(())
}
