use crate::errors::AppError;
use crate::features;
use crate::model_store::{ModelStatus, ModelStore};
use crate::models::{CustomerInput, FeatureRecord, Prediction, PredictionResponse};
use crate::prediction;
use crate::views;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Lazily loaded classifier, shared read-only once loaded.
    pub model: ModelStore,
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "model_loaded": state.model.is_loaded(),
        })),
    )
}

/// GET /
///
/// The empty prediction form with default values.
pub async fn index() -> Html<String> {
    let form = views::render_form(&CustomerInput::default());
    Html(views::render_page(&form))
}

/// POST /predict
///
/// Form submission from the browser. Re-renders the form with the submitted
/// values, followed by the verdict or the error.
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    Form(input): Form<CustomerInput>,
) -> Response {
    tracing::info!("POST /predict");
    let form = views::render_form(&input);

    match score(&state, &input).await {
        Ok((prediction, record)) => {
            let result = views::render_result(&prediction, &record);
            Html(views::render_page(&format!("{}{}", form, result))).into_response()
        }
        Err(e) => {
            let status = e.status_code();
            tracing::warn!("Form prediction failed: {}", e);
            let body = format!("{}{}", form, views::render_error(&e.public_message()));
            (status, Html(views::render_page(&body))).into_response()
        }
    }
}

/// POST /api/v1/predict
///
/// JSON counterpart of the form.
///
/// # Returns
///
/// * `Result<Json<PredictionResponse>, AppError>` - The verdict, confidence and assembled record.
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<PredictionResponse>, AppError> {
    tracing::info!("POST /api/v1/predict");
    let (prediction, record) = score(&state, &input).await?;
    let response = PredictionResponse::new(prediction, record);
    tracing::debug!(request_id = %response.request_id, "Prediction served");
    Ok(Json(response))
}

/// GET /api/v1/model
///
/// Where the classifier comes from and whether it is loaded yet.
pub async fn model_status(State(state): State<Arc<AppState>>) -> Json<ModelStatus> {
    Json(state.model.status())
}

async fn score(
    state: &AppState,
    input: &CustomerInput,
) -> Result<(Prediction, FeatureRecord), AppError> {
    // Reject bad input before touching the model
    let record = features::assemble(input)?;
    let classifier = state.model.get().await?;
    let prediction = prediction::score(classifier.as_ref(), &record)?;

    tracing::info!(
        "Prediction: {} ({}% confidence)",
        prediction.outcome.label(),
        prediction.confidence
    );
    Ok((prediction, record))
}
