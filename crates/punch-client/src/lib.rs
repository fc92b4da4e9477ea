//! Client for the attendance backend, reached through the relay.
//!
//! Covers recognition (punch in/out), enrollment and the read-only
//! user, attendance and stats endpoints used by the dashboards.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use types::Registration;
