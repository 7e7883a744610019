use std::sync::Arc;
use moviefinder_core::{Config, SanitizedConfig, SearchController, SearchPipeline};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: SearchPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: SearchPipeline) -> Self {
        Self { config, pipeline }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &SearchPipeline {
        &self.pipeline
    }

    pub fn controller(&self) -> &Arc<SearchController> {
        self.pipeline.controller()
    }
}
