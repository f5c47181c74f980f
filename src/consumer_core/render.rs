//! Render sink seam: where `(Snapshot, Alert)` pairs leave the core
//!
//! The ingestion loop calls `redraw` once per update; what happens to the
//! pair afterwards (log line, JSONL append, dashboard refresh) is the
//! sink's business. Sinks only ever receive owned copies.

use super::aggregator::Snapshot;
use super::alert::Alert;
use async_trait::async_trait;

#[derive(Debug)]
pub enum RenderError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err)
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "IO error: {}", e),
            RenderError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

#[async_trait]
pub trait RenderSink: Send {
    /// Called after every update with the fresh snapshot and its alert.
    async fn redraw(&mut self, snapshot: &Snapshot, alert: &Alert) -> Result<(), RenderError>;

    /// Sink name for logging.
    fn kind(&self) -> &'static str;
}

/// Headless sink: one log line per update, alerts at warn level.
pub struct LogSink;

#[async_trait]
impl RenderSink for LogSink {
    async fn redraw(&mut self, snapshot: &Snapshot, alert: &Alert) -> Result<(), RenderError> {
        match snapshot {
            Snapshot::TopK {
                entries,
                total_records,
            } => {
                let summary: Vec<String> = entries
                    .iter()
                    .map(|e| format!("{}={}", e.label, e.count))
                    .collect();
                log::info!("📊 {} records | top [{}]", total_records, summary.join(", "));
            }
            Snapshot::Rolling {
                values,
                latest,
                mean,
                std_dev,
            } => {
                log::info!(
                    "📈 latest={:.2} mean={:.2} std={:.2} (window {})",
                    latest,
                    mean,
                    std_dev,
                    values.len()
                );
            }
        }

        if alert.triggered {
            if let (Some(value), Some(threshold)) = (alert.value, alert.threshold) {
                log::warn!(
                    "🚨 {} alert: value {:.2} deviates beyond threshold {:.2}",
                    alert.reason.as_deref().unwrap_or("unnamed"),
                    value,
                    threshold
                );
            }
        }

        Ok(())
    }

    fn kind(&self) -> &'static str {
        "log"
    }
}
