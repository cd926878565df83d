use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::advisor::ADVICE_FALLBACK;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/assistant/advice", post(advice))
}

#[derive(Deserialize)]
pub struct AdviceRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct AdviceResponse {
    pub reply: String,
}

async fn advice(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, AppError> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("query cannot be empty".to_string()));
    }

    let started = Instant::now();
    let result = state.advisor.logistics_advice(query).await;
    state
        .metrics
        .observe_advisor(result.is_ok(), started.elapsed());

    let reply = result.unwrap_or_else(|err| {
        warn!(error = %err, "logistics advice unavailable");
        ADVICE_FALLBACK.to_string()
    });

    Ok(Json(AdviceResponse { reply }))
}
