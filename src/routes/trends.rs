use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::AppState;
use crate::{aggregate, error::Result, models::DailyTrend, ListResponse};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/trends", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<ListResponse<DailyTrend>>> {
    // ---
    info!("GET /api/trends");
    let readings = state.rebuild().await?;
    Ok(Json(aggregate::trends(&readings).into()))
}
