//! Environment-driven configuration for the producer and consumer binaries

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which aggregation the consumer runs. Fixed at startup, never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    TopKCategory,
    RollingWindow,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMode::TopKCategory => "top_k_category",
            AggregationMode::RollingWindow => "rolling_window",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "top_k_category" => Some(AggregationMode::TopKCategory),
            "rolling_window" => Some(AggregationMode::RollingWindow),
            _ => None,
        }
    }
}

/// Line encoding on the data file.
///
/// CSV rows only carry sensor readings, so `Csv` is rejected in
/// top_k_category mode at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Csv,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::Csv => "csv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "json" => Some(WireFormat::Json),
            "csv" => Some(WireFormat::Csv),
            _ => None,
        }
    }
}

/// Render sink selected on the consumer command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Log,
    Jsonl,
    Tui,
}

impl SinkKind {
    /// Parse `--sink <kind>` from the process arguments, defaulting to Log.
    pub fn parse_from_args() -> SinkKind {
        let args: Vec<String> = env::args().collect();

        if let Some(idx) = args.iter().position(|x| x == "--sink") {
            match args.get(idx + 1).map(|s| s.as_str()) {
                Some("log") => return SinkKind::Log,
                Some("jsonl") => return SinkKind::Jsonl,
                Some("tui") => return SinkKind::Tui,
                _ => {}
            }
        }

        SinkKind::Log
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse an optional env var. An unset variable takes the default; a set
/// but unparseable one refuses startup instead of silently falling back.
fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(format!("{}: cannot parse '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

fn env_mode() -> Result<AggregationMode, ConfigError> {
    let raw = env::var("BUZZFLOW_MODE").unwrap_or_else(|_| "top_k_category".to_string());
    AggregationMode::from_str(&raw).ok_or_else(|| {
        ConfigError::InvalidValue(format!(
            "BUZZFLOW_MODE must be top_k_category or rolling_window, got '{}'",
            raw
        ))
    })
}

fn env_wire_format() -> Result<WireFormat, ConfigError> {
    let raw = env::var("BUZZFLOW_WIRE_FORMAT").unwrap_or_else(|_| "json".to_string());
    WireFormat::from_str(&raw).ok_or_else(|| {
        ConfigError::InvalidValue(format!(
            "BUZZFLOW_WIRE_FORMAT must be json or csv, got '{}'",
            raw
        ))
    })
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub mode: AggregationMode,
    pub wire_format: WireFormat,
    pub data_file: PathBuf,
    pub top_k: usize,
    pub window_capacity: usize,
    pub alert_multiplier: f64,
    pub alert_min_samples: usize,
    pub snapshot_path: PathBuf,
    pub poll_interval_ms: u64,
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            mode: env_mode()?,
            wire_format: env_wire_format()?,
            data_file: env::var("BUZZFLOW_DATA_FILE")
                .unwrap_or_else(|_| "data/buzz_live.jsonl".to_string())
                .into(),
            top_k: env_parse("BUZZFLOW_TOP_K", 5)?,
            window_capacity: env_parse("BUZZFLOW_WINDOW_CAPACITY", 20)?,
            alert_multiplier: env_parse("BUZZFLOW_ALERT_MULTIPLIER", 2.0)?,
            alert_min_samples: env_parse("BUZZFLOW_ALERT_MIN_SAMPLES", 5)?,
            snapshot_path: env::var("BUZZFLOW_SNAPSHOT_PATH")
                .unwrap_or_else(|_| "data/snapshots.jsonl".to_string())
                .into(),
            poll_interval_ms: env_parse("BUZZFLOW_POLL_INTERVAL_MS", 100)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Refuse to start rather than run with undefined aggregation semantics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_TOP_K must be a positive integer".to_string(),
            ));
        }

        if self.window_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_WINDOW_CAPACITY must be a positive integer".to_string(),
            ));
        }

        if !(self.alert_multiplier.is_finite() && self.alert_multiplier > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "BUZZFLOW_ALERT_MULTIPLIER must be a positive finite number, got {}",
                self.alert_multiplier
            )));
        }

        if self.alert_min_samples == 0 {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_ALERT_MIN_SAMPLES must be a positive integer".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_POLL_INTERVAL_MS must be a positive integer".to_string(),
            ));
        }

        if self.mode == AggregationMode::TopKCategory && self.wire_format == WireFormat::Csv {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_WIRE_FORMAT=csv is only valid in rolling_window mode".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub mode: AggregationMode,
    pub wire_format: WireFormat,
    pub data_file: PathBuf,
    pub interval_ms: u64,
    pub max_file_size_mb: u64,
    pub max_rotations: u32,
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            mode: env_mode()?,
            wire_format: env_wire_format()?,
            data_file: env::var("BUZZFLOW_DATA_FILE")
                .unwrap_or_else(|_| "data/buzz_live.jsonl".to_string())
                .into(),
            interval_ms: env_parse("BUZZFLOW_INTERVAL_MS", 1000)?,
            max_file_size_mb: env_parse("BUZZFLOW_MAX_FILE_SIZE_MB", 100)?,
            max_rotations: env_parse("BUZZFLOW_MAX_ROTATIONS", 10)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_INTERVAL_MS must be a positive integer".to_string(),
            ));
        }

        if self.max_file_size_mb == 0 {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_MAX_FILE_SIZE_MB must be a positive integer".to_string(),
            ));
        }

        if self.max_rotations == 0 {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_MAX_ROTATIONS must be a positive integer".to_string(),
            ));
        }

        if self.mode == AggregationMode::TopKCategory && self.wire_format == WireFormat::Csv {
            return Err(ConfigError::InvalidValue(
                "BUZZFLOW_WIRE_FORMAT=csv is only valid in rolling_window mode".to_string(),
            ));
        }

        Ok(())
    }
}
