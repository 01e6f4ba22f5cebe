use std::sync::Arc;

use tourism_package_prediction::config::Config;
use tourism_package_prediction::handlers::AppState;
use tourism_package_prediction::model_store::ModelStore;
use tourism_package_prediction::obs;
use tourism_package_prediction::routes;

/// Main entry point for the prediction interface.
///
/// This function initializes:
/// - Logging and tracing.
/// - Configuration loading.
/// - The classifier store (with a best-effort warm-up load).
/// - HTTP routes and middleware.
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    obs::init_tracing("tourism_package_prediction=debug,tower_http=debug");

    // Load configuration
    let config = Config::from_env()?;

    let model = ModelStore::from_config(&config)?;

    // Warm the model so the first visitor does not pay for the download.
    // A failure here is not fatal: the first prediction retries the load.
    match model.get().await {
        Ok(_) => tracing::info!("✓ Classifier ready"),
        Err(e) => tracing::warn!("Classifier warm-up failed, will retry on first request: {}", e),
    }

    let app_state = Arc::new(AppState { model });

    let app = routes::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
