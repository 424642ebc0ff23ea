use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

use crate::monitoring::parse_target;
use crate::web::models::{CheckQuery, CheckResponse};
use crate::web::{AppError, AppState};

pub fn create_check_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(check_url))
}

/// Probes one URL on demand. A down target is still a `200` answer.
async fn check_url(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    let raw = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing URL parameter".to_string()))?;
    parse_target(raw).map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let result = app_state
        .prober
        .probe(raw, app_state.config.probe_timeout())
        .await;
    debug!(url = %raw, reachable = result.reachable, latency_ms = result.latency_ms, "Ad-hoc check finished.");
    Ok(Json(result.into()))
}
