//! System utilities and monitoring
//!
//! Metrics, health reporting and logging setup.

pub mod metrics;

use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::LoggingConfig;

pub use metrics::{Metrics, UserOp};

/// Health check payload
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Always `"ok"` while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Users in the directory
    pub users: usize,
    /// Open live-count connections
    pub connected: usize,
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt().with_env_filter(filter);
    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        tracing::warn!("Logging already initialised: {}", e);
    }
}
