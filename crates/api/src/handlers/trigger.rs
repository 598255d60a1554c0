//! Handler for manual cron triggers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use cron_trigger_core::request::TriggerRequest;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Message returned once a job has been started.
pub const STARTED_MESSAGE: &str = "Cron execution started in background";

/// Response body for a successful trigger.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub success: bool,
    pub cron_name: String,
    pub description: String,
    pub message: &'static str,
    /// File receiving the job's stdout and stderr.
    pub log_file: String,
}

/// POST /trigger
///
/// Launch the job named in `{"cronName": "..."}` and return immediately.
/// The body is taken raw so malformed JSON maps to our own error codes
/// rather than the extractor's rejection.
pub async fn trigger_cron(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<TriggerResponse>> {
    let cron_name = TriggerRequest::parse(&body)?;
    let outcome = state.dispatcher.trigger(&cron_name).await?;

    Ok(Json(TriggerResponse {
        success: true,
        cron_name: outcome.job.name,
        description: outcome.job.description,
        message: STARTED_MESSAGE,
        log_file: outcome.log_file.display().to_string(),
    }))
}
