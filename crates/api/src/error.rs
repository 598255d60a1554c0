use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cron_trigger_core::error::TriggerError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`TriggerError`] for dispatch failures and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A dispatch error from `cron_trigger_core`.
    #[error(transparent)]
    Trigger(#[from] TriggerError),

    /// No route matches the request path and method.
    #[error("Not Found")]
    NotFound,

    /// A handler panicked; details stay in the logs.
    #[error("Internal server error")]
    Internal,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Trigger(err) => match err {
                TriggerError::MalformedRequest(_) => {
                    (StatusCode::BAD_REQUEST, "MALFORMED_REQUEST")
                }
                TriggerError::MissingParameter(_) => {
                    (StatusCode::BAD_REQUEST, "MISSING_PARAMETER")
                }
                TriggerError::UnknownJob(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_JOB"),
                TriggerError::ScriptNotFound(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "SCRIPT_NOT_FOUND")
                }
                TriggerError::LaunchFailed { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "LAUNCH_FAILED")
                }
            },
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Failures are logged where they happen; rejections are logged here.
        if status.is_client_error() && status != StatusCode::NOT_FOUND {
            tracing::warn!(code, error = %self, "Trigger rejected");
        }

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Fallback handler for unrouted paths and unsupported methods.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Response for `CatchPanicLayer`: the panic message is logged, the client
/// gets the usual JSON error body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    AppError::Internal.into_response()
}
