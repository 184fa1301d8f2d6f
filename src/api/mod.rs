use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::{ItineraryCoordinator, TravelAiError, VERSION, models::ItineraryDocument, models::TripRequest};

#[derive(Serialize)]
pub struct ApiError {
    pub error: &'static str,
    pub message: String,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

impl IntoResponse for TravelAiError {
    fn into_response(self) -> Response {
        let status = match &self {
            TravelAiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TravelAiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %self, "Itinerary generation failed");
                "generation_failed"
            }
            _ => {
                warn!(error = %self, "Itinerary request rejected");
                self.error_code()
            }
        };
        let body = ApiError {
            error,
            message: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(coordinator: Arc<ItineraryCoordinator>) -> Router {
    Router::new()
        .route("/itinerary", post(create_itinerary))
        .route("/health", get(health))
        .with_state(coordinator)
}

async fn create_itinerary(
    State(coordinator): State<Arc<ItineraryCoordinator>>,
    Json(request): Json<TripRequest>,
) -> Result<Json<ItineraryDocument>, TravelAiError> {
    let document = coordinator.generate_itinerary(request).await?;
    Ok(Json(document))
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: VERSION,
    })
}
