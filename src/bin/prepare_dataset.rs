//! Prepares the training split and uploads it back to the dataset repository.
//!
//! Reads `DATASET_PATH` when set, otherwise downloads the raw CSV from the
//! hub. Writes `X_train.csv`, `X_test.csv`, `y_train.csv` and `y_test.csv`
//! into `PREPARED_DIR`, then commits all four files.

use anyhow::Context;
use tourism_package_prediction::config::Config;
use tourism_package_prediction::dataset_prep::{self, SplitConfig, Table};
use tourism_package_prediction::hub_client::{HubClient, RepoRef};
use tourism_package_prediction::obs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing("tourism_package_prediction=info,prepare_dataset=info");

    let config = Config::from_env()?;
    let token = config.require_token()?.to_string();
    let client = HubClient::new(config.hub_endpoint.clone(), Some(token))?;
    let repo = RepoRef::dataset(config.dataset_repo_id.clone());

    let table = match config.dataset_path {
        Some(ref path) => {
            tracing::info!("Reading dataset from {}", path.display());
            Table::from_path(path)?
        }
        None => {
            let bytes = client
                .download(&repo, &config.dataset_filename)
                .await
                .context("Downloading raw dataset")?;
            Table::from_csv(bytes.as_slice())?
        }
    };
    tracing::info!("Dataset loaded successfully.");

    let prepared = dataset_prep::prepare(table, SplitConfig::default())?;
    prepared.write_to_dir(&config.prepared_dir)?;

    let files = prepared.commit_files()?;
    let commit = client
        .upload_files(&repo, &files, "Upload train/test split")
        .await
        .context("Uploading prepared dataset")?;

    tracing::info!(
        "Uploaded {} files to {} ({})",
        files.len(),
        repo,
        commit.commit_oid.as_deref().unwrap_or("unknown commit")
    );
    Ok(())
}
