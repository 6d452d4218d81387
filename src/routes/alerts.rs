use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::AppState;
use crate::{aggregate, error::Result, models::Alert, ListResponse};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/alerts", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<ListResponse<Alert>>> {
    // ---
    info!("GET /api/alerts");
    let readings = state.rebuild().await?;
    Ok(Json(aggregate::alerts(&readings).into()))
}
