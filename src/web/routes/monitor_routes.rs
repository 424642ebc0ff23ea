use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tracing::info;

use crate::db::models::{normalize_url, Monitor, NewMonitor, Owner};
use crate::monitoring::parse_target;
use crate::sweep::MonitorCheck;
use crate::web::models::{CreateMonitorRequest, UpdateOwnerRequest};
use crate::web::{AppError, AppState};

pub fn create_owner_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{owner_id}", put(update_owner))
        .route(
            "/{owner_id}/monitors",
            get(list_monitors).post(create_monitor),
        )
        .route("/{owner_id}/monitors/{monitor_id}", delete(delete_monitor))
        .route(
            "/{owner_id}/monitors/{monitor_id}/check",
            post(check_monitor),
        )
}

async fn update_owner(
    State(app_state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
    payload: Result<Json<UpdateOwnerRequest>, JsonRejection>,
) -> Result<Json<Owner>, AppError> {
    let Json(payload) = payload?;
    let owner = app_state
        .store
        .upsert_owner(Owner::new(&owner_id, payload.email))
        .await?;
    Ok(Json(owner))
}

async fn list_monitors(
    State(app_state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<Monitor>>, AppError> {
    let monitors = app_state.store.list_monitors(&owner_id).await?;
    Ok(Json(monitors))
}

async fn create_monitor(
    State(app_state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
    payload: Result<Json<CreateMonitorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Monitor>), AppError> {
    let Json(payload) = payload?;
    if payload.name.trim().is_empty() || payload.url.trim().is_empty() {
        return Err(AppError::InvalidInput("Name and URL are required".to_string()));
    }
    parse_target(&normalize_url(&payload.url)).map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let monitor = app_state
        .store
        .create_monitor(
            &owner_id,
            NewMonitor {
                name: payload.name.trim().to_string(),
                url: payload.url,
            },
        )
        .await?;
    info!(owner_id = %owner_id, monitor_id = %monitor.id, url = %monitor.url, "Monitor created.");
    Ok((StatusCode::CREATED, Json(monitor)))
}

async fn delete_monitor(
    State(app_state): State<Arc<AppState>>,
    Path((owner_id, monitor_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    if app_state.store.delete_monitor(&owner_id, &monitor_id).await? {
        info!(owner_id = %owner_id, monitor_id = %monitor_id, "Monitor deleted.");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Monitor not found".to_string()))
    }
}

/// Runs one monitor through the sweep pipeline right now.
async fn check_monitor(
    State(app_state): State<Arc<AppState>>,
    Path((owner_id, monitor_id)): Path<(String, String)>,
) -> Result<Json<MonitorCheck>, AppError> {
    let coordinator = app_state.sweep_coordinator()?;
    let check = coordinator
        .check_monitor(&owner_id, &monitor_id)
        .await
        .map_err(AppError::from_check)?;
    Ok(Json(check))
}
