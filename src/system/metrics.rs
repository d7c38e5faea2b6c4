//! Metrics collection for hxdash
//!
//! Each [`Metrics`] owns its own Prometheus registry rather than registering
//! into the process-global default, so several app instances (tests) can
//! coexist.

use crate::core::Result;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// User directory mutation kinds, used as the `op` label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOp {
    /// A user was created
    Create,
    /// A user was updated
    Update,
    /// A user was deleted
    Delete,
}

impl UserOp {
    fn label(self) -> &'static str {
        match self {
            UserOp::Create => "create",
            UserOp::Update => "update",
            UserOp::Delete => "delete",
        }
    }
}

/// Application metrics and the registry they are exported from
pub struct Metrics {
    registry: Registry,
    /// Currently open live-count streams
    pub connected_viewers: IntGauge,
    /// Users currently in the directory
    pub users_total: IntGauge,
    /// Directory mutations by operation
    pub user_mutations: IntCounterVec,
    /// Successful logins
    pub logins: IntCounter,
}

impl Metrics {
    /// Create and register all metrics
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let connected_viewers = IntGauge::new(
            "hxdash_connected_viewers",
            "Number of open live dashboard connections",
        )?;
        let users_total = IntGauge::new("hxdash_users_total", "Number of users in the directory")?;
        let user_mutations = IntCounterVec::new(
            Opts::new("hxdash_user_mutations_total", "User directory mutations"),
            &["op"],
        )?;
        let logins = IntCounter::new("hxdash_logins_total", "Successful logins")?;

        registry.register(Box::new(connected_viewers.clone()))?;
        registry.register(Box::new(users_total.clone()))?;
        registry.register(Box::new(user_mutations.clone()))?;
        registry.register(Box::new(logins.clone()))?;

        Ok(Self {
            registry,
            connected_viewers,
            users_total,
            user_mutations,
            logins,
        })
    }

    /// Count one directory mutation
    pub fn record_user_op(&self, op: UserOp) {
        self.user_mutations.with_label_values(&[op.label()]).inc();
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&self.registry.gather())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instances_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.logins.inc();
        assert_eq!(a.logins.get(), 1);
        assert_eq!(b.logins.get(), 0);
    }

    #[test]
    fn test_render_contains_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.record_user_op(UserOp::Create);
        metrics.record_user_op(UserOp::Create);
        metrics.users_total.set(3);

        let text = metrics.render().unwrap();
        assert!(text.contains("hxdash_user_mutations_total{op=\"create\"} 2"));
        assert!(text.contains("hxdash_users_total 3"));
        assert!(text.contains("hxdash_connected_viewers 0"));
    }
}
