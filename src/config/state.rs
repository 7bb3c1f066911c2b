// Application state module
// Process-wide state built once at startup and shared by reference

use super::types::Config;
use crate::model::ModelStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub models: ModelStore,
}

impl AppState {
    /// Create `AppState`; with the startup load strategy this reads the artifact
    pub async fn new(config: &Config) -> Self {
        let models = ModelStore::new(&config.model);
        models.preload().await;

        Self {
            config: config.clone(),
            models,
        }
    }
}
