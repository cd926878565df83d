use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use tracing::info;

use crate::error::AppError;
use crate::models::store::StoreConfig;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<StoreConfig> {
    Json(state.store_config.read().await.clone())
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StoreConfig>,
) -> Result<Json<StoreConfig>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("store name cannot be empty".to_string()));
    }
    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "store address cannot be empty".to_string(),
        ));
    }

    let mut config = state.store_config.write().await;
    *config = payload.clone();
    info!(store = %payload.name, "store settings updated");

    Ok(Json(payload))
}
