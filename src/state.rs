//! Shared display state between the ingestion loop and the dashboard task
//!
//! The ingestion side writes owned snapshot copies; the dashboard task only
//! ever reads, so the window itself is never shared across tasks.

use crate::consumer_core::{Alert, Snapshot};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedState = Arc<RwLock<DashboardState>>;

pub fn shared() -> SharedState {
    Arc::new(RwLock::new(DashboardState::new()))
}

/// Latest `(Snapshot, Alert)` pair plus running counters for the footer.
#[derive(Debug, Clone)]
pub struct DashboardState {
    snapshot: Option<Snapshot>,
    alert: Alert,
    records_seen: u64,
    alerts_seen: u64,
    last_update: Option<i64>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            alert: Alert::none(),
            records_seen: 0,
            alerts_seen: 0,
            last_update: None,
        }
    }

    pub fn apply(&mut self, snapshot: Snapshot, alert: Alert) {
        self.records_seen += 1;
        if alert.triggered {
            self.alerts_seen += 1;
        }
        self.snapshot = Some(snapshot);
        self.alert = alert;
        self.last_update = Some(Utc::now().timestamp());
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn alert(&self) -> &Alert {
        &self.alert
    }

    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    pub fn alerts_seen(&self) -> u64 {
        self.alerts_seen
    }

    pub fn last_update(&self) -> Option<i64> {
        self.last_update
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_tracks_counters() {
        let mut state = DashboardState::new();
        assert!(state.snapshot().is_none());

        let snapshot = Snapshot::Rolling {
            values: vec![10.0],
            latest: 10.0,
            mean: 10.0,
            std_dev: 0.0,
        };
        state.apply(snapshot.clone(), Alert::none());
        state.apply(
            snapshot,
            Alert {
                triggered: true,
                reason: Some("deviation".to_string()),
                value: Some(99.0),
                threshold: Some(1.0),
            },
        );

        assert_eq!(state.records_seen(), 2);
        assert_eq!(state.alerts_seen(), 1);
        assert!(state.alert().triggered);
        assert!(state.last_update().is_some());
    }
}
