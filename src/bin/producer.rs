//! Producer Binary - Synthetic Stream Writer
//!
//! Appends one synthetic record per interval to the live data file the
//! consumer tails.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin producer
//! ```
//!
//! ## Environment Variables
//!
//! - BUZZFLOW_MODE - top_k_category or rolling_window (default: top_k_category)
//! - BUZZFLOW_WIRE_FORMAT - json or csv; csv only in rolling_window mode (default: json)
//! - BUZZFLOW_DATA_FILE - Live data file path (default: data/buzz_live.jsonl)
//! - BUZZFLOW_INTERVAL_MS - Milliseconds between records (default: 1000)
//! - BUZZFLOW_MAX_FILE_SIZE_MB - Rotate the data file past this size (default: 100)
//! - BUZZFLOW_MAX_ROTATIONS - Rotated files to keep (default: 10)
//! - RUST_LOG - Logging level (optional, default: info)

use buzzflow::config::ProducerConfig;
use buzzflow::producer_core::{RecordGenerator, StreamWriter};
use tokio::time::{interval, Duration};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = ProducerConfig::from_env()?;

    log::info!("🚀 Starting buzzflow producer");
    log::info!("   Mode: {}", config.mode.as_str());
    log::info!("   Wire format: {}", config.wire_format.as_str());
    log::info!("   Data file: {}", config.data_file.display());
    log::info!("   Interval: {}ms", config.interval_ms);

    let mut generator = RecordGenerator::new(config.mode, config.wire_format);
    let mut writer = StreamWriter::new(
        &config.data_file,
        config.max_file_size_mb,
        config.max_rotations,
    )?;

    let mut ticker = interval(Duration::from_millis(config.interval_ms));
    let mut produced = 0u64;

    log::info!("✅ Producer running - writing records...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("⏹  Interrupted, stopping producer");
                break;
            }

            _ = ticker.tick() => {
                let line = generator.next_line()?;
                writer.write_line(&line)?;
                produced += 1;

                log::debug!("Produced: {}", line);
                if produced % 60 == 0 {
                    log::info!("📊 Produced {} records", produced);
                }
            }
        }
    }

    log::info!("✅ Producer closed after {} records", produced);
    Ok(())
}
