use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::error;

use crate::web::models::{NotifyRequest, SuccessResponse};
use crate::web::{AppError, AppState};

pub fn create_notify_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(send_notification))
}

/// Sends a down-alert right away, outside of any sweep.
async fn send_notification(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Json(payload) = payload?;
    let email = non_blank(payload.email.as_deref());
    let website_name = non_blank(payload.website_name.as_deref());
    let (Some(email), Some(website_name)) = (email, website_name) else {
        return Err(AppError::InvalidInput("Missing info".to_string()));
    };
    let website_url = payload.website_url.as_deref().unwrap_or_default();

    let notifier = app_state.notification_service()?;
    notifier
        .notify_down(email, website_name, website_url, Utc::now())
        .await
        .map_err(|e| {
            error!(to = %email, error = %e, "Manual alert failed.");
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(SuccessResponse { success: true }))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
