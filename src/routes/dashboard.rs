//! Summary endpoints: dashboard headline numbers and pothole totals.

use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::AppState;
use crate::{
    aggregate,
    error::Result,
    models::{DashboardStats, PotholeSummary},
};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/dashboard-stats", get(dashboard_stats))
        .route("/api/potholes/summary", get(pothole_summary))
}

async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    // ---
    info!("GET /api/dashboard-stats");
    let readings = state.rebuild().await?;
    Ok(Json(aggregate::dashboard_stats(&readings)))
}

async fn pothole_summary(State(state): State<AppState>) -> Result<Json<PotholeSummary>> {
    // ---
    info!("GET /api/potholes/summary");
    let readings = state.rebuild().await?;
    Ok(Json(aggregate::pothole_summary(&readings)))
}
