use crate::errors::AppError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;

/// Kind of repository on the hub; each lives under its own URL prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoType {
    Model,
    Dataset,
    Space,
}

impl RepoType {
    /// Prefix used by file resolve URLs (models have none).
    fn resolve_prefix(self) -> &'static str {
        match self {
            RepoType::Model => "",
            RepoType::Dataset => "datasets/",
            RepoType::Space => "spaces/",
        }
    }

    /// Plural segment used by the commit API.
    fn api_segment(self) -> &'static str {
        match self {
            RepoType::Model => "models",
            RepoType::Dataset => "datasets",
            RepoType::Space => "spaces",
        }
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RepoType::Model => "model",
            RepoType::Dataset => "dataset",
            RepoType::Space => "space",
        })
    }
}

/// A repository identified by `<owner>/<name>` and its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub repo_id: String,
    pub repo_type: RepoType,
}

impl RepoRef {
    pub fn model(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            repo_type: RepoType::Model,
        }
    }

    pub fn dataset(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            repo_type: RepoType::Dataset,
        }
    }

    pub fn space(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            repo_type: RepoType::Space,
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.repo_type, self.repo_id)
    }
}

/// A file to add (or overwrite) in a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFile {
    /// `/`-separated path inside the repository.
    pub path_in_repo: String,
    pub content: Vec<u8>,
}

/// What the hub reports back after a commit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    #[serde(default)]
    pub commit_url: Option<String>,
    #[serde(default)]
    pub commit_oid: Option<String>,
}

/// Client for the model/dataset/space hub.
#[derive(Clone)]
pub struct HubClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HubClient {
    /// Creates a new `HubClient`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base URL of the hub, e.g. `https://huggingface.co`.
    /// * `token` - Access token; anonymous reads work without one.
    pub fn new(endpoint: String, token: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create hub client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// URL that serves the raw bytes of `filename` on the main revision.
    pub fn resolve_url(&self, repo: &RepoRef, filename: &str) -> String {
        format!(
            "{}/{}{}/resolve/main/{}",
            self.endpoint,
            repo.repo_type.resolve_prefix(),
            repo.repo_id,
            filename.trim_start_matches('/')
        )
    }

    fn commit_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/api/{}/{}/commit/main",
            self.endpoint,
            repo.repo_type.api_segment(),
            repo.repo_id
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Downloads one file from a repository.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<u8>, AppError>` - The file contents.
    pub async fn download(&self, repo: &RepoRef, filename: &str) -> Result<Vec<u8>, AppError> {
        let url = self.resolve_url(repo, filename);
        tracing::info!("Downloading {} from {}", filename, repo);
        tracing::debug!("Hub URL: {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Hub request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Hub returned {} for {}: {}",
                status, filename, error_text
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to read {} from hub: {}", filename, e))
        })?;

        tracing::info!("✓ Downloaded {} ({} bytes)", filename, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Builds the NDJSON commit payload: a header line, then one line per file.
    pub fn commit_payload(summary: &str, files: &[CommitFile]) -> String {
        let mut lines = Vec::with_capacity(files.len() + 1);
        lines.push(
            json!({
                "key": "header",
                "value": {"summary": summary, "description": ""}
            })
            .to_string(),
        );
        for file in files {
            lines.push(
                json!({
                    "key": "file",
                    "value": {
                        "content": BASE64.encode(&file.content),
                        "path": file.path_in_repo,
                        "encoding": "base64"
                    }
                })
                .to_string(),
            );
        }
        let mut payload = lines.join("\n");
        payload.push('\n');
        payload
    }

    /// Uploads files to a repository as a single commit on `main`.
    ///
    /// # Arguments
    ///
    /// * `repo` - Target repository.
    /// * `files` - Files to add or overwrite.
    /// * `summary` - Commit title.
    pub async fn upload_files(
        &self,
        repo: &RepoRef,
        files: &[CommitFile],
        summary: &str,
    ) -> Result<CommitInfo, AppError> {
        if self.token.is_none() {
            return Err(AppError::ExternalApiError(format!(
                "Uploading to {} requires an access token",
                repo
            )));
        }
        if files.is_empty() {
            return Err(AppError::BadRequest("Nothing to upload".to_string()));
        }

        let url = self.commit_url(repo);
        tracing::info!("Committing {} file(s) to {}", files.len(), repo);
        for file in files {
            tracing::debug!("  + {} ({} bytes)", file.path_in_repo, file.content.len());
        }

        let response = self
            .authorize(self.client.post(&url))
            .header("Content-Type", "application/x-ndjson")
            .body(Self::commit_payload(summary, files))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Failed to commit: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Hub commit to {} failed {}: {}",
                repo, status, error_text
            )));
        }

        let info: CommitInfo = response.json().await.unwrap_or_else(|e| {
            tracing::warn!("Unexpected hub commit response: {}", e);
            CommitInfo::default()
        });

        tracing::info!(
            "✓ Commit created on {}: {}",
            repo,
            info.commit_url.as_deref().unwrap_or("(no url returned)")
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_urls_per_repo_type() {
        let client = HubClient::new("https://hub.example/".to_string(), None).unwrap();

        assert_eq!(
            client.resolve_url(
                &RepoRef::model("Parthi07/Package-Prediction-Model"),
                "models/best.json"
            ),
            "https://hub.example/Parthi07/Package-Prediction-Model/resolve/main/models/best.json"
        );
        assert_eq!(
            client.resolve_url(
                &RepoRef::dataset("Parthi07/Tourism-Package-Prediction"),
                "tourism.csv"
            ),
            "https://hub.example/datasets/Parthi07/Tourism-Package-Prediction/resolve/main/tourism.csv"
        );
        assert_eq!(
            client.commit_url(&RepoRef::space("a/b")),
            "https://hub.example/api/spaces/a/b/commit/main"
        );
    }

    #[test]
    fn test_commit_payload_lines() {
        let files = vec![CommitFile {
            path_in_repo: "X_train.csv".to_string(),
            content: b"Age\n30\n".to_vec(),
        }];
        let payload = HubClient::commit_payload("Upload split", &files);
        let lines: Vec<serde_json::Value> = payload
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["key"], "header");
        assert_eq!(lines[0]["value"]["summary"], "Upload split");
        assert_eq!(lines[1]["value"]["path"], "X_train.csv");
        assert_eq!(lines[1]["value"]["encoding"], "base64");
        assert_eq!(lines[1]["value"]["content"], "QWdlCjMwCg==");
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let client = HubClient::new("https://hub.example".to_string(), None).unwrap();
        let files = vec![CommitFile {
            path_in_repo: "app.py".to_string(),
            content: vec![1],
        }];
        let result = client
            .upload_files(&RepoRef::space("a/b"), &files, "deploy")
            .await;
        assert!(matches!(result, Err(AppError::ExternalApiError(_))));
    }
}
