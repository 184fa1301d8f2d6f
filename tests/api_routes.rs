//! HTTP surface of the itinerary service

mod common;

use std::sync::Arc;

use aventra::{ItineraryCoordinator, web};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{Stalled, failing_providers, generation_config, jaipur_request, with_content};

async fn send(coordinator: ItineraryCoordinator, request: Request<Body>) -> (StatusCode, Value) {
    let response = web::app(Arc::new(coordinator)).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_itinerary(body: &Value) -> Request<Body> {
    Request::post("/api/itinerary")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let coordinator = ItineraryCoordinator::new(failing_providers(), generation_config());
    let request = Request::get("/api/health").body(Body::empty()).unwrap();
    let (status, body) = send(coordinator, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_itinerary_with_fallbacks() {
    let coordinator = ItineraryCoordinator::new(failing_providers(), generation_config());
    let payload = serde_json::to_value(jaipur_request()).unwrap();
    let (status, body) = send(coordinator, post_itinerary(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["itinerary"].as_array().unwrap().len(), 3);
    assert_eq!(body["metadata"]["destination"], "Jaipur");
    assert_eq!(body["itinerary"][0]["time_blocks"][1]["start_time"], "08:00");
}

#[tokio::test]
async fn test_validation_maps_to_422() {
    let coordinator = ItineraryCoordinator::new(failing_providers(), generation_config());
    let mut payload = serde_json::to_value(jaipur_request()).unwrap();
    payload["location"]["destination"] = json!("  ");
    let (status, body) = send(coordinator, post_itinerary(&payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn test_timeout_maps_to_504() {
    let mut config = generation_config();
    config.request_timeout_seconds = 1;
    let coordinator = ItineraryCoordinator::new(with_content(Arc::new(Stalled)), config);
    let payload = serde_json::to_value(jaipur_request()).unwrap();
    let (status, body) = send(coordinator, post_itinerary(&payload)).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "request_timeout");
}

#[tokio::test]
async fn test_generation_failure_maps_to_500() {
    let coordinator = ItineraryCoordinator::new(failing_providers(), generation_config());
    coordinator.shutdown();
    let payload = serde_json::to_value(jaipur_request()).unwrap();
    let (status, body) = send(coordinator, post_itinerary(&payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "generation_failed", "message": "The itinerary could not be generated."}));
}
