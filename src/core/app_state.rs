//! Application State Management
//!
//! This module defines the central AppState that holds the directory, the
//! presence hub and the services handlers need. It is built once from the
//! configuration and shared with every handler through axum's `State`.

use std::sync::Arc;
use tracing::info;

use crate::core::config::Config;
use crate::core::Result;
use crate::directory::UserDirectory;
use crate::presence::PresenceHub;
use crate::session::SessionKeys;
use crate::system::Metrics;
use crate::views::Renderer;

/// Handle passed to handlers
pub type SharedState = Arc<AppState>;

/// Central application state holding all services and components
pub struct AppState {
    /// Application configuration
    pub config: Config,

    /// User directory
    pub directory: UserDirectory,

    /// Live viewer counter
    pub presence: Arc<PresenceHub>,

    /// Session token signing
    pub sessions: SessionKeys,

    /// Compiled templates
    pub views: Renderer,

    /// Prometheus metrics
    pub metrics: Metrics,
}

impl AppState {
    /// Build every service from `config`
    pub fn new(config: Config) -> Result<Self> {
        let metrics = Metrics::new()?;
        let presence = Arc::new(PresenceHub::with_gauge(metrics.connected_viewers.clone()));

        let directory = if config.directory.seed {
            UserDirectory::seeded()
        } else {
            UserDirectory::new()
        };
        metrics.users_total.set(directory.len() as i64);
        info!("User directory ready with {} users", directory.len());

        Ok(Self {
            sessions: SessionKeys::from_config(&config.session),
            views: Renderer::new()?,
            directory,
            presence,
            metrics,
            config,
        })
    }

    /// Build the state and wrap it for sharing
    pub fn shared(config: Config) -> Result<SharedState> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// Refresh the directory size gauge
    pub fn sync_user_gauge(&self) {
        self.metrics.users_total.set(self.directory.len() as i64);
    }
}
