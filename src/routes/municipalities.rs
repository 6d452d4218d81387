use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::AppState;
use crate::{aggregate, error::Result, models::MunicipalityStats, ListResponse};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/municipalities", get(handler))
}

async fn handler(State(state): State<AppState>) -> Result<Json<ListResponse<MunicipalityStats>>> {
    // ---
    info!("GET /api/municipalities");
    let readings = state.rebuild().await?;
    Ok(Json(aggregate::municipalities(&readings).into()))
}
