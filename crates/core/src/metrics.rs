//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog requests (discover/search, outcome, latency)
//! - Search pipeline (debounce publishes, stale responses)
//! - Trending store operations

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog
// =============================================================================

/// Catalog requests total by mode and result.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "moviefinder_catalog_requests_total",
            "Total catalog requests",
        ),
        &["mode", "result"], // mode: "discover", "search"; result: "success", "empty", "error"
    )
    .unwrap()
});

/// Catalog request duration in seconds.
pub static CATALOG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "moviefinder_catalog_request_duration_seconds",
            "Duration of catalog requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["mode"],
    )
    .unwrap()
});

// =============================================================================
// Search pipeline
// =============================================================================

/// Settled terms published by the debouncer.
pub static DEBOUNCE_PUBLISHES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "moviefinder_debounce_publishes_total",
        "Total settled search terms published after the quiet period",
    )
    .unwrap()
});

/// Fetch outcomes dropped because a newer fetch was started.
pub static STALE_RESPONSES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "moviefinder_stale_responses_total",
        "Total catalog responses discarded by the staleness check",
    )
    .unwrap()
});

// =============================================================================
// Trending
// =============================================================================

/// Trending store operations by operation and result.
pub static TRENDING_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "moviefinder_trending_operations_total",
            "Total trending store operations",
        ),
        &["operation", "result"], // operation: "find", "create", "increment", "load"; result: "success", "error"
    )
    .unwrap()
});

/// All core metrics, for registration by the server's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CATALOG_REQUESTS.clone()),
        Box::new(CATALOG_REQUEST_DURATION.clone()),
        Box::new(DEBOUNCE_PUBLISHES.clone()),
        Box::new(STALE_RESPONSES.clone()),
        Box::new(TRENDING_OPERATIONS.clone()),
    ]
}
