use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::advisor::PROFILE_FALLBACK;
use crate::engine::transitions;
use crate::engine::transitions::NewDriver;
use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", post(register_driver).get(list_drivers))
        .route("/drivers/login", post(driver_login))
        .route("/drivers/:id", get(get_driver))
        .route("/drivers/:id/approve", post(approve_driver))
        .route("/drivers/:id/reject", post(reject_driver))
        .route("/drivers/:id/analyze", post(analyze_driver))
}

async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewDriver>,
) -> Result<Json<Driver>, AppError> {
    let result = transitions::register_driver(&state, payload);
    state.metrics.observe_transition("register", result.is_ok());
    result.map(Json)
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Driver>> {
    let drivers = state
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(drivers)
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Driver>, AppError> {
    let driver = state
        .drivers
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    Ok(Json(driver.value().clone()))
}

async fn approve_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Driver>, AppError> {
    let result = transitions::approve_driver(&state, &id);
    state.metrics.observe_transition("approve", result.is_ok());
    result.map(Json)
}

async fn reject_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Driver>, AppError> {
    let result = transitions::reject_driver(&state, &id);
    state.metrics.observe_transition("reject", result.is_ok());
    result.map(Json)
}

#[derive(Deserialize)]
pub struct DriverLoginRequest {
    pub email: String,
    pub password: String,
}

async fn driver_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DriverLoginRequest>,
) -> Result<Json<Driver>, AppError> {
    let email = payload.email.trim();
    let driver = state
        .drivers
        .iter()
        .find(|entry| entry.value().email.eq_ignore_ascii_case(email))
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::Unauthorized("unknown email or password".to_string()))?;

    match driver.password.as_deref() {
        Some(password) if password == payload.password => {}
        _ => return Err(AppError::Unauthorized("unknown email or password".to_string())),
    }

    match driver.status {
        DriverStatus::Pending => Err(AppError::Unauthorized(
            "registration is awaiting approval".to_string(),
        )),
        DriverStatus::Inactive => {
            Err(AppError::Unauthorized("account is disabled".to_string()))
        }
        _ => Ok(Json(driver)),
    }
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub reply: String,
}

async fn analyze_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let (bio, vehicle) = {
        let driver = state
            .drivers
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;
        (driver.bio.clone(), driver.vehicle.label())
    };

    let started = Instant::now();
    let result = state.advisor.analyze_profile(&bio, vehicle).await;
    state
        .metrics
        .observe_advisor(result.is_ok(), started.elapsed());

    let reply = result.unwrap_or_else(|err| {
        warn!(driver_id = %id, error = %err, "profile analysis unavailable");
        PROFILE_FALLBACK.to_string()
    });

    Ok(Json(AnalysisResponse { reply }))
}
