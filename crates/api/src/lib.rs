//! Cron trigger server library.
//!
//! Exposes the building blocks (config, state, dispatcher, error handling,
//! routes, logging) so integration tests and the binary entrypoint can both
//! access them.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod router;
pub mod routes;
pub mod state;
