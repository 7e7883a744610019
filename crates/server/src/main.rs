use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moviefinder_core::{
    load_config, validate_config, AppwriteTrendingStore, Config, SearchController, SearchPipeline,
    SqliteTrendingStore, TmdbCatalogClient, TrendingAggregator, TrendingBackend, TrendingStore,
};
use moviefinder_server::api::create_router;
use moviefinder_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MOVIEFINDER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Catalog endpoint: {}", config.catalog.base_url);
    info!("Debounce quiet period: {}ms", config.search.debounce_ms);

    let catalog =
        TmdbCatalogClient::new(&config.catalog).context("Failed to create catalog client")?;

    let trending = create_trending(&config)?;

    let controller = Arc::new(SearchController::new(Arc::new(catalog), trending));
    let pipeline = SearchPipeline::start(
        Arc::clone(&controller),
        Duration::from_millis(config.search.debounce_ms),
    )
    .await;
    info!("Search pipeline started");

    let state = Arc::new(AppState::new(config.clone(), pipeline));

    // Create router
    let app = create_router(Arc::clone(&state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    state.pipeline().shutdown();

    Ok(())
}

/// Build the trending aggregator for the configured backend, if any.
fn create_trending(config: &Config) -> Result<Option<Arc<TrendingAggregator>>> {
    let store: Arc<dyn TrendingStore> = match config.trending.backend {
        TrendingBackend::Appwrite => {
            let appwrite = config
                .trending
                .appwrite
                .as_ref()
                .context("Appwrite backend selected but no appwrite config provided")?;
            info!(
                "Initializing Appwrite trending store at {} (collection {})",
                appwrite.endpoint, appwrite.collection_id
            );
            Arc::new(
                AppwriteTrendingStore::new(appwrite)
                    .context("Failed to create Appwrite trending store")?,
            )
        }
        TrendingBackend::Sqlite => {
            let sqlite = config.trending.sqlite.clone().unwrap_or_default();
            info!("Initializing SQLite trending store at {:?}", sqlite.path);
            Arc::new(
                SqliteTrendingStore::new(&sqlite.path)
                    .context("Failed to create SQLite trending store")?,
            )
        }
        TrendingBackend::None => {
            info!("No trending store configured");
            return Ok(None);
        }
    };

    let aggregator = TrendingAggregator::new(
        store,
        config.catalog.image_base_url.clone(),
        config.search.trending_limit,
    );
    info!(
        "Trending ranking backed by {} store (top {})",
        aggregator.store_name(),
        config.search.trending_limit
    );
    Ok(Some(Arc::new(aggregator)))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
