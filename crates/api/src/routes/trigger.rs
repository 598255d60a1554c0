//! Route definitions for the trigger endpoint.

use axum::routing::post;
use axum::Router;

use crate::error::not_found;
use crate::handlers::trigger;
use crate::state::AppState;

/// ```text
/// POST   /trigger                   -> trigger_cron
/// ```
///
/// Other methods on `/trigger` answer 404 like unknown paths.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/trigger",
        post(trigger::trigger_cron).fallback(not_found),
    )
}
