use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::{error::AppError, AppState};

/// Guards the sweep trigger with `Authorization: Bearer <cron_secret>`.
/// Open when no secret is configured.
pub async fn cron_auth(
    State(state): State<Arc<AppState>>,
    req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(secret) = state.config.cron_secret.as_deref() else {
        return Ok(next.run(req).await);
    };

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim);

    if token != Some(secret) {
        warn!(path = %req.uri().path(), "Rejected sweep trigger with a missing or wrong token.");
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }
    Ok(next.run(req).await)
}
