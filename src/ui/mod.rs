//! Live terminal dashboard
//!
//! The consumer core knows nothing about rendering; it pushes owned
//! `(Snapshot, Alert)` pairs into [`DashboardSink`], and the terminal task
//! reads them back out of the shared state on its own refresh cadence.

pub mod layout;
pub mod terminal;

use crate::consumer_core::{Alert, RenderError, RenderSink, Snapshot};
use crate::state::SharedState;
use async_trait::async_trait;

/// Render sink that feeds the dashboard's shared state.
pub struct DashboardSink {
    state: SharedState,
}

impl DashboardSink {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RenderSink for DashboardSink {
    async fn redraw(&mut self, snapshot: &Snapshot, alert: &Alert) -> Result<(), RenderError> {
        let mut state = self.state.write().await;
        state.apply(snapshot.clone(), alert.clone());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "tui"
    }
}
