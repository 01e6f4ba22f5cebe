//! Load-once holder for the classifier.
//!
//! The model is fetched on first use and then shared read-only for the
//! lifetime of the process. A failed load leaves the store empty; the next
//! prediction request tries again.

use crate::artifact_validator::VerifiedArtifact;
use crate::classifier::{Classifier, ModelArtifact};
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::hub_client::{HubClient, RepoRef};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Where the classifier comes from.
#[derive(Clone)]
pub enum ModelSource {
    /// A file in a hub model repository.
    Hub {
        client: HubClient,
        repo: RepoRef,
        filename: String,
    },
    /// An artifact already on local disk.
    LocalFile(PathBuf),
    /// An in-memory classifier (tests, embedding).
    Preloaded(Arc<dyn Classifier>),
}

impl ModelSource {
    /// Picks the local path when configured, otherwise the hub.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        if let Some(ref path) = config.model_path {
            return Ok(ModelSource::LocalFile(path.clone()));
        }
        let client = HubClient::new(config.hub_endpoint.clone(), config.hub_token.clone())?;
        Ok(ModelSource::Hub {
            client,
            repo: RepoRef::model(config.model_repo_id.clone()),
            filename: config.model_filename.clone(),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            ModelSource::Hub { repo, filename, .. } => format!("{}/{}", repo.repo_id, filename),
            ModelSource::LocalFile(path) => path.display().to_string(),
            ModelSource::Preloaded(_) => "in-memory".to_string(),
        }
    }
}

#[derive(Clone)]
struct LoadedModel {
    classifier: Arc<dyn Classifier>,
    sha256: Option<String>,
    loaded_at: DateTime<Utc>,
}

/// Reported by `GET /api/v1/model`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub source: String,
    pub loaded: bool,
    pub sha256: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

pub struct ModelStore {
    source: ModelSource,
    expected_sha256: Option<String>,
    cell: OnceCell<LoadedModel>,
}

impl ModelStore {
    pub fn new(source: ModelSource, expected_sha256: Option<String>) -> Self {
        Self {
            source,
            expected_sha256,
            cell: OnceCell::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(
            ModelSource::from_config(config)?,
            config.model_sha256.clone(),
        ))
    }

    /// Wraps an already-built classifier.
    pub fn preloaded(classifier: Arc<dyn Classifier>) -> Self {
        Self::new(ModelSource::Preloaded(classifier), None)
    }

    /// Returns the classifier, loading it on first call.
    ///
    /// Concurrent first callers wait on the same load.
    pub async fn get(&self) -> Result<Arc<dyn Classifier>, AppError> {
        let loaded = self
            .cell
            .get_or_try_init(|| self.load())
            .await
            .with_context(|| format!("Loading classifier from {}", self.source.describe()))?;
        Ok(Arc::clone(&loaded.classifier))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub fn status(&self) -> ModelStatus {
        let loaded = self.cell.get();
        ModelStatus {
            source: self.source.describe(),
            loaded: loaded.is_some(),
            sha256: loaded.and_then(|m| m.sha256.clone()),
            loaded_at: loaded.map(|m| m.loaded_at),
        }
    }

    async fn load(&self) -> Result<LoadedModel, AppError> {
        let bytes = match &self.source {
            ModelSource::Preloaded(classifier) => {
                return Ok(LoadedModel {
                    classifier: Arc::clone(classifier),
                    sha256: None,
                    loaded_at: Utc::now(),
                });
            }
            ModelSource::Hub {
                client,
                repo,
                filename,
            } => client.download(repo, filename).await.map_err(|e| {
                AppError::ModelUnavailable(format!("Model download failed: {}", e))
            })?,
            ModelSource::LocalFile(path) => tokio::fs::read(path).await.map_err(|e| {
                AppError::ModelUnavailable(format!(
                    "Failed to read model file {}: {}",
                    path.display(),
                    e
                ))
            })?,
        };

        let artifact = VerifiedArtifact::verify(bytes, self.expected_sha256.as_deref())
            .ok_or_else(|| {
                AppError::ModelUnavailable("Model artifact checksum mismatch".to_string())
            })?;

        let model = ModelArtifact::from_slice(&artifact.bytes)?;
        tracing::info!(
            "✓ Classifier loaded from {} (sha256 {})",
            self.source.describe(),
            artifact.sha256
        );

        Ok(LoadedModel {
            classifier: Arc::new(model),
            sha256: Some(artifact.sha256),
            loaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureRecord;

    struct Constant(f64);

    impl Classifier for Constant {
        fn predict_proba(&self, _record: &FeatureRecord) -> Result<f64, AppError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_preloaded_store() {
        let store = ModelStore::preloaded(Arc::new(Constant(0.7)));
        assert!(!store.is_loaded());

        let record = crate::features::assemble(&Default::default()).unwrap();
        let classifier = store.get().await.unwrap();
        assert_eq!(classifier.predict_proba(&record).unwrap(), 0.7);
        assert!(store.is_loaded());
        assert_eq!(store.status().source, "in-memory");
    }

    #[tokio::test]
    async fn test_missing_local_file_is_unavailable_and_retryable() {
        let store = ModelStore::new(
            ModelSource::LocalFile(PathBuf::from("/nonexistent/model.json")),
            None,
        );

        let err = store.get().await.err().unwrap();
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        );
        assert!(!store.is_loaded());
        assert!(store.get().await.is_err());
    }
}
