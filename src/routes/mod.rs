use std::sync::Arc;

use axum::Router;
use chrono::Local;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{dataset, error::Result, location::LocationResolver, Config, SensorReading};

mod alerts;
mod dashboard;
mod health;
mod municipalities;
mod sensor_data;
mod trends;
mod uploads;

// ---

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<dyn LocationResolver>,
}

impl AppState {
    /// Rebuild the dataset from the CSV upload directory, dating bare
    /// timestamps with the local calendar day.
    pub async fn rebuild(&self) -> Result<Vec<SensorReading>> {
        let today = Local::now().date_naive();
        dataset::build_dataset(&self.config.csv_dir, self.resolver.as_ref(), today).await
    }
}

pub fn router(config: Config, resolver: Arc<dyn LocationResolver>) -> Router {
    // ---
    let max_upload_bytes = config.max_upload_bytes;
    Router::new()
        .merge(sensor_data::router())
        .merge(alerts::router())
        .merge(trends::router())
        .merge(municipalities::router())
        .merge(dashboard::router())
        .merge(uploads::router(max_upload_bytes))
        .merge(health::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { config, resolver })
}
