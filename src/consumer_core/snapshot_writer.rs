//! JSONL sink: one `{timestamp, snapshot, alert}` line per update

use super::aggregator::Snapshot;
use super::alert::Alert;
use super::render::{RenderError, RenderSink};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Serialize)]
struct SnapshotLine<'a> {
    timestamp: i64,
    snapshot: &'a Snapshot,
    alert: &'a Alert,
}

pub struct JsonlSink {
    writer: BufWriter<File>,
    last_flush: Instant,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("📝 Writing snapshots to {}", path.display());

        Ok(Self {
            writer: BufWriter::new(file),
            last_flush: Instant::now(),
        })
    }

    fn write_line(&mut self, snapshot: &Snapshot, alert: &Alert) -> Result<(), RenderError> {
        let line = SnapshotLine {
            timestamp: Utc::now().timestamp(),
            snapshot,
            alert,
        };

        let json = serde_json::to_string(&line)?;
        writeln!(self.writer, "{}", json)?;

        // Alerts land on disk immediately; steady-state lines batch for 5s.
        if alert.triggered || self.last_flush.elapsed() > Duration::from_secs(5) {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()?;
        self.last_flush = Instant::now();
        Ok(())
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[async_trait]
impl RenderSink for JsonlSink {
    async fn redraw(&mut self, snapshot: &Snapshot, alert: &Alert) -> Result<(), RenderError> {
        self.write_line(snapshot, alert)
    }

    fn kind(&self) -> &'static str {
        "jsonl"
    }
}
