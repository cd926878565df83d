use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::is_plausible_email;
use crate::error::AppError;
use crate::models::audit::{AuditEvent, AuditRecord};
use crate::state::AppState;

const APP_CONTEXT: &str = "Delivery Hub Manager Panel";
const DEFAULT_LOGINS_LIMIT: usize = 20;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logins", get(recent_logins))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    /// Advisory: whether the audit backend knows this account. Never a gate.
    pub known_account: bool,
}

async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    if !is_plausible_email(&email) {
        return Err(AppError::BadRequest("malformed email".to_string()));
    }

    if !state.verifier.verify(&email, &payload.password) {
        return Err(AppError::Unauthorized(
            "invalid administrator credentials".to_string(),
        ));
    }

    record_audit_event(&state, &headers, email.clone(), AuditEvent::Login);
    let known_account = state.audit.account_exists(&email).await;

    Ok(Json(LoginResponse {
        ok: true,
        known_account,
    }))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
}

async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    let email = payload.email.trim().to_lowercase();
    if !is_plausible_email(&email) {
        return Err(AppError::BadRequest("malformed email".to_string()));
    }
    if payload.password.is_empty() {
        return Err(AppError::BadRequest("password cannot be empty".to_string()));
    }

    record_audit_event(&state, &headers, email, AuditEvent::AccountCreated);

    Ok(Json(RegisterResponse { ok: true }))
}

#[derive(Deserialize)]
pub struct LoginsQuery {
    pub limit: Option<usize>,
}

async fn recent_logins(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginsQuery>,
) -> Json<Vec<AuditRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOGINS_LIMIT);
    Json(state.audit.recent(limit).await)
}

/// Fire-and-forget: the write happens on a detached task and its outcome
/// only lands in the metrics.
fn record_audit_event(state: &AppState, headers: &HeaderMap, email: String, event: AuditEvent) {
    let device_info = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let record = AuditRecord {
        email,
        logged_at: Utc::now(),
        app_context: APP_CONTEXT.to_string(),
        device_info,
        event,
    };

    let audit = state.audit.clone();
    let metrics = state.metrics.clone();
    tokio::spawn(async move {
        let event_label = match record.event {
            AuditEvent::Login => "LOGIN",
            AuditEvent::AccountCreated => "ACCOUNT_CREATED",
        };
        let stored = audit.append(record).await;
        metrics.observe_audit(event_label, stored);
    });
}
