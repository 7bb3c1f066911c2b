// Model store module
// Hands out the model artifact according to the configured load strategy

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::artifact::ModelArtifact;
use crate::config::{LoadStrategy, ModelConfig};
use crate::error::ModelError;
use crate::logger;

/// Source of the model artifact for request handlers
pub struct ModelStore {
    path: PathBuf,
    strategy: LoadStrategy,
    cached: RwLock<Option<Arc<ModelArtifact>>>,
}

impl ModelStore {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            path: PathBuf::from(&config.path),
            strategy: config.load_strategy,
            cached: RwLock::new(None),
        }
    }

    pub const fn strategy(&self) -> LoadStrategy {
        self.strategy
    }

    /// Load the artifact once for the startup strategy; no-op otherwise.
    /// A failure is logged and leaves the store empty.
    pub async fn preload(&self) {
        if self.strategy != LoadStrategy::Startup {
            return;
        }
        if let Err(e) = self.reload().await {
            logger::log_error(&format!("Failed to preload model: {e}"));
        }
    }

    /// Re-read the artifact into the cache.
    /// On failure the previously loaded model, if any, stays in service.
    pub async fn reload(&self) -> Result<(), ModelError> {
        let artifact = ModelArtifact::load(&self.path).await?;
        logger::log_info(&format!(
            "[Model] Loaded {} ({} features)",
            self.path.display(),
            artifact.n_features()
        ));
        *self.cached.write().await = Some(Arc::new(artifact));
        Ok(())
    }

    /// Artifact for one request
    pub async fn get(&self) -> Result<Arc<ModelArtifact>, ModelError> {
        match self.strategy {
            LoadStrategy::PerRequest => ModelArtifact::load(&self.path).await.map(Arc::new),
            LoadStrategy::Startup => self
                .cached
                .read()
                .await
                .clone()
                .ok_or_else(|| ModelError::NotFound(self.path.clone())),
        }
    }

    /// Whether a prediction request could currently find the artifact
    pub async fn is_available(&self) -> bool {
        match self.strategy {
            LoadStrategy::PerRequest => tokio::fs::try_exists(&self.path).await.unwrap_or(false),
            LoadStrategy::Startup => self.cached.read().await.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScalingMode;
    use std::path::Path;

    const MODEL: &str =
        r#"{"estimator": {"type": "linear_regression", "coefficients": [1.0], "intercept": 2.0}}"#;

    fn store(path: &Path, strategy: LoadStrategy) -> ModelStore {
        ModelStore::new(&ModelConfig {
            path: path.to_string_lossy().into_owned(),
            load_strategy: strategy,
            scaling: ScalingMode::PerRequest,
        })
    }

    #[tokio::test]
    async fn test_per_request_reads_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let store = store(&path, LoadStrategy::PerRequest);

        assert!(!store.is_available().await);
        assert!(matches!(store.get().await, Err(ModelError::NotFound(_))));

        std::fs::write(&path, MODEL).unwrap();
        assert!(store.is_available().await);
        assert_eq!(store.get().await.unwrap().n_features(), 1);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(store.get().await, Err(ModelError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_startup_keeps_loaded_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, MODEL).unwrap();

        let store = store(&path, LoadStrategy::Startup);
        store.preload().await;
        assert!(store.is_available().await);

        std::fs::remove_file(&path).unwrap();
        assert!(store.get().await.is_ok());
        assert!(store.reload().await.is_err());
        // failed reload keeps the previous model
        assert!(store.get().await.is_ok());
    }

    #[tokio::test]
    async fn test_startup_without_file_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let store = store(&path, LoadStrategy::Startup);
        store.preload().await;

        assert!(!store.is_available().await);
        assert!(matches!(store.get().await, Err(ModelError::NotFound(_))));

        std::fs::write(&path, MODEL).unwrap();
        store.reload().await.unwrap();
        assert!(store.get().await.is_ok());
    }
}
