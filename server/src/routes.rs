use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of the backend's trigger notification.
#[derive(Deserialize)]
pub struct SensorUpdate {
    pub sensor: String,
    pub triggered: bool,
}

/// `POST /api/sensor` — the hardware backend reports a trigger change.
pub async fn update_sensor(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SensorUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.store.set_sensor(payload.triggered).await?;
    info!(
        sensor = %payload.sensor,
        triggered = payload.triggered,
        "sensor status updated"
    );

    Ok(Json(json!({ "success": true, "data": status })))
}

/// `DELETE /api/sensor` — the front end lowers the trigger after reacting.
pub async fn reset_sensor(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.reset_sensor().await?;

    Ok(Json(json!({ "success": true })))
}

/// `GET /api/order` — current order-flow snapshot, read-only.
pub async fn order_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.borrow().clone();
    Json(snapshot)
}
