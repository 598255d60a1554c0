use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::error::not_found;
use crate::state::AppState;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "cron-trigger-server";

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the server answers.
    pub status: &'static str,
    pub service: &'static str,
    /// Port the server was configured to listen on.
    pub port: u16,
    /// Number of jobs in the registry.
    pub available_crons: usize,
}

/// GET /health -- returns service status and the configured job count.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        port: state.config.port,
        available_crons: state.dispatcher.registry().len(),
    })
}

/// Mount the health check route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check).fallback(not_found))
}
