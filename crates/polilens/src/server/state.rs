//! Application state for the analysis server

use std::sync::Arc;

use crate::config::PolilensConfig;
use crate::error::Result;
use crate::pipeline::PolicyPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PolilensConfig,
    pipeline: PolicyPipeline,
}

impl AppState {
    /// Create new application state with production collaborators.
    pub fn new(config: PolilensConfig) -> Result<Self> {
        tracing::info!("Initializing analysis pipeline...");
        let pipeline = PolicyPipeline::from_config(&config)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create state around an already-assembled pipeline.
    pub fn with_pipeline(config: PolilensConfig, pipeline: PolicyPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pipeline }),
        }
    }

    pub fn config(&self) -> &PolilensConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &PolicyPipeline {
        &self.inner.pipeline
    }
}
