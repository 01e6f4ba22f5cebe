use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_HUB_ENDPOINT: &str = "https://huggingface.co";
pub const DEFAULT_MODEL_REPO_ID: &str = "Parthi07/Package-Prediction-Model";
pub const DEFAULT_MODEL_FILENAME: &str = "models/best_package_prediction_model_v1.json";
pub const DEFAULT_DATASET_REPO_ID: &str = "Parthi07/Tourism-Package-Prediction";
pub const DEFAULT_DATASET_FILENAME: &str = "tourism.csv";
pub const DEFAULT_SPACE_REPO_ID: &str = "Parthi07/Tourism-Package-Prediction";
pub const DEFAULT_DEPLOYMENT_DIR: &str = "tourism_project/deployment";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub hub_endpoint: String,
    pub hub_token: Option<String>,
    pub model_repo_id: String,
    pub model_filename: String,
    pub model_path: Option<PathBuf>, // Local artifact, skips the hub download
    pub model_sha256: Option<String>,
    pub dataset_repo_id: String,
    pub dataset_filename: String,
    pub dataset_path: Option<PathBuf>,
    pub prepared_dir: PathBuf,
    pub space_repo_id: String,
    pub deployment_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 7860,
            hub_endpoint: DEFAULT_HUB_ENDPOINT.to_string(),
            hub_token: None,
            model_repo_id: DEFAULT_MODEL_REPO_ID.to_string(),
            model_filename: DEFAULT_MODEL_FILENAME.to_string(),
            model_path: None,
            model_sha256: None,
            dataset_repo_id: DEFAULT_DATASET_REPO_ID.to_string(),
            dataset_filename: DEFAULT_DATASET_FILENAME.to_string(),
            dataset_path: None,
            prepared_dir: PathBuf::from("."),
            space_repo_id: DEFAULT_SPACE_REPO_ID.to_string(),
            deployment_dir: PathBuf::from(DEFAULT_DEPLOYMENT_DIR),
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn repo_id_var(name: &str, default: &str) -> anyhow::Result<String> {
    let repo_id = optional_var(name).unwrap_or_else(|| default.to_string());
    let parts: Vec<&str> = repo_id.split('/').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.trim().is_empty()) {
        anyhow::bail!("{} must look like <owner>/<name>, got '{}'", name, repo_id);
    }
    Ok(repo_id)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            hub_endpoint: optional_var("HF_ENDPOINT")
                .unwrap_or(defaults.hub_endpoint)
                .trim_end_matches('/')
                .to_string(),
            hub_token: optional_var("HF_TOKEN"),
            model_repo_id: repo_id_var("MODEL_REPO_ID", DEFAULT_MODEL_REPO_ID)?,
            model_filename: optional_var("MODEL_FILENAME").unwrap_or(defaults.model_filename),
            model_path: optional_var("MODEL_PATH").map(PathBuf::from),
            model_sha256: optional_var("MODEL_SHA256")
                .map(|digest| {
                    let digest = digest.trim().to_lowercase();
                    if digest.len() != 64 || hex::decode(&digest).is_err() {
                        anyhow::bail!("MODEL_SHA256 must be a 64 character hex digest");
                    }
                    Ok(digest)
                })
                .transpose()?,
            dataset_repo_id: repo_id_var("DATASET_REPO_ID", DEFAULT_DATASET_REPO_ID)?,
            dataset_filename: optional_var("DATASET_FILENAME")
                .unwrap_or(defaults.dataset_filename),
            dataset_path: optional_var("DATASET_PATH").map(PathBuf::from),
            prepared_dir: optional_var("PREPARED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.prepared_dir),
            space_repo_id: repo_id_var("SPACE_REPO_ID", DEFAULT_SPACE_REPO_ID)?,
            deployment_dir: optional_var("DEPLOYMENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.deployment_dir),
        };

        let endpoint = url::Url::parse(&config.hub_endpoint)
            .map_err(|e| anyhow::anyhow!("HF_ENDPOINT is not a valid URL: {}", e))?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            anyhow::bail!("HF_ENDPOINT must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Hub endpoint: {}", config.hub_endpoint);
        tracing::debug!(
            "Hub token: {}",
            if config.hub_token.is_some() {
                "[REDACTED]"
            } else {
                "not set"
            }
        );
        match config.model_path {
            Some(ref path) => tracing::debug!("Model path: {}", path.display()),
            None => tracing::debug!(
                "Model artifact: {}/{}",
                config.model_repo_id,
                config.model_filename
            ),
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Token required for write operations against the hub.
    pub fn require_token(&self) -> anyhow::Result<&str> {
        self.hub_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("HF_TOKEN environment variable required for uploads"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_published_repos() {
        let config = Config::default();
        assert_eq!(config.hub_endpoint, "https://huggingface.co");
        assert_eq!(config.model_repo_id, "Parthi07/Package-Prediction-Model");
        assert_eq!(config.dataset_filename, "tourism.csv");
        assert_eq!(
            config.deployment_dir,
            PathBuf::from("tourism_project/deployment")
        );
    }

    #[test]
    fn test_require_token() {
        let mut config = Config::default();
        assert!(config.require_token().is_err());

        config.hub_token = Some("hf_secret".to_string());
        assert_eq!(config.require_token().unwrap(), "hf_secret");
    }
}
