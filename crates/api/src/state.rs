use std::sync::Arc;

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc` and read-only.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Trigger dispatcher (owns the job registry).
    pub dispatcher: Arc<Dispatcher>,
}
