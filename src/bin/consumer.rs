//! Consumer Binary - Streaming Aggregation and Alerting
//!
//! Tails the live data file, folds each record into the configured
//! aggregation, evaluates the deviation alert rule, and pushes every
//! `(Snapshot, Alert)` pair to the selected render sink.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin consumer -- --sink tui
//! ```
//!
//! ## Environment Variables
//!
//! - BUZZFLOW_MODE - top_k_category or rolling_window (default: top_k_category)
//! - BUZZFLOW_WIRE_FORMAT - json or csv; csv only in rolling_window mode (default: json)
//! - BUZZFLOW_DATA_FILE - Live data file path (default: data/buzz_live.jsonl)
//! - BUZZFLOW_TOP_K - Categories shown in top_k_category mode (default: 5)
//! - BUZZFLOW_WINDOW_CAPACITY - Rolling window capacity (default: 20)
//! - BUZZFLOW_ALERT_MULTIPLIER - Deviation threshold in std-devs (default: 2.0)
//! - BUZZFLOW_ALERT_MIN_SAMPLES - Samples required before alerting (default: 5)
//! - BUZZFLOW_SNAPSHOT_PATH - Output path for the jsonl sink (default: data/snapshots.jsonl)
//! - BUZZFLOW_POLL_INTERVAL_MS - Tail poll interval (default: 100)
//! - RUST_LOG - Logging level (optional, default: info)

use buzzflow::config::{AggregationMode, ConsumerConfig, SinkKind};
use buzzflow::consumer_core::{
    run_ingestion, Aggregator, AlertEvaluator, ConsumerPipeline, FileTailTransport, JsonlSink,
    LogSink, RecordNormalizer, RenderSink,
};
use buzzflow::state;
use buzzflow::ui;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = ConsumerConfig::from_env()?;
    let sink_kind = SinkKind::parse_from_args();

    log::info!("🚀 Starting buzzflow consumer");
    log::info!("   Mode: {}", config.mode.as_str());
    log::info!("   Wire format: {}", config.wire_format.as_str());
    log::info!("   Data file: {}", config.data_file.display());
    match config.mode {
        AggregationMode::TopKCategory => {
            log::info!("   Top K: {}", config.top_k);
        }
        AggregationMode::RollingWindow => {
            log::info!("   Window capacity: {}", config.window_capacity);
            log::info!(
                "   Alert: {} std-devs after {} samples",
                config.alert_multiplier,
                config.alert_min_samples
            );
        }
    }

    let mut transport = FileTailTransport::new(
        config.data_file.clone(),
        Duration::from_millis(config.poll_interval_ms),
    );
    if let Err(e) = transport.open().await {
        log::error!(
            "Cannot open data file {} (is the producer running?): {}",
            config.data_file.display(),
            e
        );
        return Err(e.into());
    }

    let pipeline = ConsumerPipeline::new(
        RecordNormalizer::new(config.mode, config.wire_format),
        Aggregator::from_config(&config)?,
        AlertEvaluator::new(config.alert_multiplier, config.alert_min_samples),
    );

    let shutdown = Arc::new(Notify::new());

    match sink_kind {
        SinkKind::Tui => {
            let shared = state::shared();
            let mut sink = ui::DashboardSink::new(shared.clone());

            let ingest_shutdown = shutdown.clone();
            let ingest = tokio::spawn(async move {
                run_ingestion(transport, pipeline, &mut sink, ingest_shutdown).await;
            });

            // The dashboard owns the foreground; returning means the user quit.
            ui::terminal::run_ui(shared).await?;

            shutdown.notify_one();
            ingest.await?;
        }
        SinkKind::Log | SinkKind::Jsonl => {
            let mut sink: Box<dyn RenderSink> = match sink_kind {
                SinkKind::Jsonl => Box::new(JsonlSink::new(&config.snapshot_path)?),
                _ => Box::new(LogSink),
            };
            log::info!("📊 Sink: {}", sink.kind());

            let ctrl_c_shutdown = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c_shutdown.notify_one();
                }
            });

            run_ingestion(transport, pipeline, sink.as_mut(), shutdown).await;
        }
    }

    log::info!("✅ Consumer closed");
    Ok(())
}
