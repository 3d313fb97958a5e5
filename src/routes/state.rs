use std::sync::Arc;

use crate::{
    config::ScoringConfig,
    db::MovieRepository,
    error::{AppError, AppResult},
    services::MetadataProvider,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn MovieRepository>,
    /// `None` when no metadata provider is configured
    pub metadata: Option<Arc<dyn MetadataProvider>>,
    pub scoring: ScoringConfig,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn MovieRepository>,
        metadata: Option<Arc<dyn MetadataProvider>>,
        scoring: ScoringConfig,
    ) -> Self {
        Self {
            repository,
            metadata,
            scoring,
        }
    }

    /// The metadata provider, or `NotConfigured` when it is disabled
    pub fn metadata(&self) -> AppResult<&dyn MetadataProvider> {
        self.metadata.as_deref().ok_or_else(|| {
            AppError::NotConfigured(
                "Movie metadata provider is not configured; set TMDB_API_KEY".to_string(),
            )
        })
    }
}
