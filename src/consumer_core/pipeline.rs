//! Single-writer ingestion loop
//!
//! One loop owns the whole chain: pull a line from the transport, then run
//! normalize → update → evaluate → redraw to completion before the next
//! pull. The transport read is the only suspension point, so the window
//! never needs a lock and a shutdown request only lands between records.

use super::aggregator::{Aggregator, Snapshot};
use super::alert::{Alert, AlertEvaluator};
use super::normalizer::RecordNormalizer;
use super::render::RenderSink;
use super::transport::Transport;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

pub struct ConsumerPipeline {
    normalizer: RecordNormalizer,
    aggregator: Aggregator,
    evaluator: AlertEvaluator,
}

impl ConsumerPipeline {
    pub fn new(
        normalizer: RecordNormalizer,
        aggregator: Aggregator,
        evaluator: AlertEvaluator,
    ) -> Self {
        Self {
            normalizer,
            aggregator,
            evaluator,
        }
    }

    /// Feed one raw line through the core. Returns `None` when the
    /// normalizer drops the line; aggregation state is untouched then.
    pub fn process_line(&mut self, raw: &str) -> Option<(Snapshot, Alert)> {
        let record = match self.normalizer.normalize(raw) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Dropping record: {} | line: {}", e, raw);
                return None;
            }
        };

        let snapshot = self.aggregator.update(&record);
        let alert = self.evaluator.evaluate(&snapshot);
        Some((snapshot, alert))
    }
}

/// Run the ingestion loop until the shutdown signal fires.
///
/// Transport errors are logged and retried after a back-off; a record that
/// is already in flight always completes before shutdown takes effect.
pub async fn run_ingestion(
    mut transport: impl Transport,
    mut pipeline: ConsumerPipeline,
    sink: &mut dyn RenderSink,
    shutdown: Arc<Notify>,
) {
    log::info!("✅ Consumer running - processing records...");

    let mut processed = 0u64;
    let mut dropped = 0u64;
    let mut last_log = Instant::now();

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                log::info!("⏹  Shutdown requested, stopping ingestion");
                break;
            }

            line_result = transport.next_line() => {
                match line_result {
                    Ok(Some(line)) => {
                        match pipeline.process_line(&line) {
                            Some((snapshot, alert)) => {
                                processed += 1;
                                if let Err(e) = sink.redraw(&snapshot, &alert).await {
                                    log::error!("Redraw failed on {} sink: {}", sink.kind(), e);
                                }
                            }
                            None => dropped += 1,
                        }

                        if last_log.elapsed().as_secs() >= 10 {
                            log::info!("📊 Processed {} records ({} dropped)", processed, dropped);
                            last_log = Instant::now();
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::error!("Transport error: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }

    log::info!(
        "✅ Ingestion stopped after {} records ({} dropped)",
        processed,
        dropped
    );
}
