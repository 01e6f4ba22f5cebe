//! Uploads the deployment folder to the hosted Space.

use anyhow::Context;
use tourism_package_prediction::config::Config;
use tourism_package_prediction::hub_client::{HubClient, RepoRef};
use tourism_package_prediction::obs;
use tourism_package_prediction::publishing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing("tourism_package_prediction=info,publish_space=info");

    let config = Config::from_env()?;
    let token = config.require_token()?.to_string();
    let client = HubClient::new(config.hub_endpoint.clone(), Some(token))?;
    let repo = RepoRef::space(config.space_repo_id.clone());

    let files = publishing::collect_folder(&config.deployment_dir)?;
    tracing::info!(
        "Publishing {} files from {} to {}",
        files.len(),
        config.deployment_dir.display(),
        repo
    );

    let summary = format!("Deploy {}", config.deployment_dir.display());
    let commit = client
        .upload_files(&repo, &files, &summary)
        .await
        .context("Uploading deployment folder")?;

    println!(
        "✓ Published to {}",
        commit
            .commit_url
            .unwrap_or_else(|| format!("{}/spaces/{}", config.hub_endpoint, repo.repo_id))
    );
    Ok(())
}
