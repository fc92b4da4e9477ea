//! HTTPS-to-HTTP relay.
//!
//! This crate provides:
//! - A catch-all forwarder mounted under a fixed prefix
//! - Byte-exact body forwarding with a minimal header allow-list
//! - Permissive CORS on every response
//! - Request IDs, request logging and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod target;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use routes::create_router;
pub use state::AppState;
