//! Domain logic for the cron trigger server.
//!
//! Job descriptors and the static registry, trigger request parsing, secret
//! providers, child environment construction and the detached launcher all
//! live here. Nothing in this crate knows about HTTP.

pub mod environment;
pub mod error;
pub mod job;
pub mod launcher;
pub mod registry;
pub mod request;
pub mod secret;
