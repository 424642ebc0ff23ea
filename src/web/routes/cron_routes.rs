use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tracing::info;

use crate::web::models::CronResponse;
use crate::web::{AppError, AppState};

pub fn create_cron_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(run_sweep).post(run_sweep))
}

async fn run_sweep(State(app_state): State<Arc<AppState>>) -> Result<Json<CronResponse>, AppError> {
    info!("Sweep triggered over HTTP.");
    let coordinator = app_state.sweep_coordinator()?;
    let report = coordinator.run_sweep().await?;

    Ok(Json(CronResponse {
        success: true,
        emails: report.notifications_sent,
        checked: report.monitors_checked,
        errors: report.errors,
        cancelled: report.cancelled,
    }))
}
