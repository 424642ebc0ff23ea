use axum::{http::Method, middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::db::MonitorStore;
use crate::monitoring::LivenessProbe;
use crate::notifications::NotificationService;
use crate::server::config::ServerConfig;
use crate::sweep::SweepCoordinator;
use crate::web::{middleware::auth, routes::*};

pub use error::AppError;

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MonitorStore>,
    pub prober: Arc<dyn LivenessProbe>,
    /// `Err` holds the reason the alert transport could not be built.
    pub notifier: Result<Arc<NotificationService>, String>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn notification_service(&self) -> Result<Arc<NotificationService>, AppError> {
        self.notifier.clone().map_err(|details| AppError::SetupFailed {
            error: "Notification transport is not configured".to_string(),
            details,
        })
    }

    pub fn sweep_coordinator(&self) -> Result<SweepCoordinator, AppError> {
        Ok(SweepCoordinator::new(
            self.store.clone(),
            self.prober.clone(),
            self.notification_service()?,
            self.config.sweep_options(),
        ))
    }
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api/check", check_routes::create_check_router())
        .nest(
            "/api/cron",
            cron_routes::create_cron_router().route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth::cron_auth,
            )),
        )
        .nest("/api/notify", notify_routes::create_notify_router())
        .nest("/api/owners", monitor_routes::create_owner_router())
        .with_state(app_state)
        .layer(cors)
}
