use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Builds the application router.
///
/// # Routes
///
/// - `GET /` – prediction form.
/// - `POST /predict` – form submission, HTML result.
/// - `POST /api/v1/predict` – JSON prediction.
/// - `GET /api/v1/model` – model load status.
/// - `GET /health` – liveness.
pub fn router(state: Arc<AppState>) -> Router {
    let app_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict_form))
        .route("/api/v1/predict", post(handlers::predict_json))
        .route("/api/v1/model", get(handlers::model_status))
        .layer(
            ServiceBuilder::new()
                // A form post is a few hundred bytes
                .layer(RequestBodyLimitLayer::new(64 * 1024)),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .merge(app_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
