use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::engine::transitions;
use crate::engine::transitions::NewDelivery;
use crate::error::AppError;
use crate::geo;
use crate::models::delivery::{Delivery, DeliveryStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deliveries", post(launch_delivery).get(list_deliveries))
        .route("/deliveries/available", get(available_deliveries))
        .route("/deliveries/:id", get(get_delivery))
        .route("/deliveries/:id/tracking", get(tracking))
        .route("/deliveries/:id/accept", post(accept_delivery))
        .route("/deliveries/:id/finish", post(finish_delivery))
}

async fn launch_delivery(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewDelivery>,
) -> Result<Json<Delivery>, AppError> {
    let origin = state.store_config.read().await.clone();
    let result = transitions::launch_delivery(&state, payload, &origin);
    state.metrics.observe_transition("launch", result.is_ok());
    result.map(Json)
}

async fn list_deliveries(State(state): State<Arc<AppState>>) -> Json<Vec<Delivery>> {
    let deliveries = state
        .deliveries
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(deliveries)
}

/// Broadcast deliveries still waiting for a driver.
async fn available_deliveries(State(state): State<Arc<AppState>>) -> Json<Vec<Delivery>> {
    let deliveries = state
        .deliveries
        .iter()
        .filter(|entry| {
            let delivery = entry.value();
            delivery.is_broadcast && delivery.status == DeliveryStatus::Pending
        })
        .map(|entry| entry.value().clone())
        .collect();
    Json(deliveries)
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = state
        .deliveries
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))?;

    Ok(Json(delivery.value().clone()))
}

#[derive(Serialize)]
pub struct TrackingResponse {
    pub delivery: Delivery,
    pub distance_km: Option<f64>,
    pub eta_estimate: Option<String>,
}

async fn tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackingResponse>, AppError> {
    let delivery = state
        .deliveries
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))?
        .value()
        .clone();

    let distance_km = match (&delivery.current_location, &delivery.destination) {
        (Some(from), Some(to)) => Some(geo::haversine_km(from, to)),
        _ => None,
    };
    let eta_estimate = distance_km.map(geo::estimate_eta);

    Ok(Json(TrackingResponse {
        delivery,
        distance_km,
        eta_estimate,
    }))
}

#[derive(Deserialize)]
pub struct AcceptRequest {
    pub driver_id: String,
}

async fn accept_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<AcceptRequest>,
) -> Result<Json<Delivery>, AppError> {
    let result = transitions::accept_delivery(&state, &id, &payload.driver_id);
    state.metrics.observe_transition("accept", result.is_ok());
    result.map(Json)
}

async fn finish_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Delivery>, AppError> {
    let result = transitions::finish_delivery(&state, &id);
    state.metrics.observe_transition("finish", result.is_ok());
    result.map(Json)
}
