use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::AppState;
use crate::{error::Result, ListResponse, SensorReading};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/sensor-data", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<ListResponse<SensorReading>>> {
    // ---
    info!("GET /api/sensor-data");
    let readings = state.rebuild().await?;
    Ok(Json(readings.into()))
}
