//! Record normalization from raw transport lines to typed records

use crate::config::{AggregationMode, WireFormat};
use chrono::Utc;
use serde::Deserialize;

/// One observation from the stream. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Ingestion timestamp (Unix seconds), assigned by the consumer.
    pub received_at: i64,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One category event (top_k_category mode). Each record counts once.
    Category { label: String },
    /// One sensor reading (rolling_window mode).
    Reading { timestamp: String, value: f64 },
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Category { .. } => "category",
            Payload::Reading { .. } => "reading",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ValidationError {
    EmptyPayload,
    Malformed(String),
    MissingField(&'static str),
    InvalidNumber { field: &'static str, raw: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyPayload => write!(f, "empty payload"),
            ValidationError::Malformed(msg) => write!(f, "malformed payload: {}", msg),
            ValidationError::MissingField(field) => {
                write!(f, "missing required field '{}'", field)
            }
            ValidationError::InvalidNumber { field, raw } => {
                write!(f, "field '{}' is not a finite number: '{}'", field, raw)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Deserialize)]
struct RawCategoryLine {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReadingLine {
    timestamp: Option<String>,
    value: Option<f64>,
}

/// Converts one raw transport payload into a canonical [`Record`].
///
/// Pure apart from the ingestion timestamp; a failed line never mutates
/// anything downstream, the caller logs and skips it.
pub struct RecordNormalizer {
    mode: AggregationMode,
    wire_format: WireFormat,
}

impl RecordNormalizer {
    pub fn new(mode: AggregationMode, wire_format: WireFormat) -> Self {
        Self { mode, wire_format }
    }

    pub fn normalize(&self, raw: &str) -> Result<Record, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }

        let payload = match self.mode {
            AggregationMode::TopKCategory => self.parse_category(raw)?,
            AggregationMode::RollingWindow => match self.wire_format {
                WireFormat::Json => self.parse_reading_json(raw)?,
                WireFormat::Csv => self.parse_reading_csv(raw)?,
            },
        };

        Ok(Record {
            received_at: Utc::now().timestamp(),
            payload,
        })
    }

    fn parse_category(&self, raw: &str) -> Result<Payload, ValidationError> {
        let line: RawCategoryLine = serde_json::from_str(raw)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let label = line.category.ok_or(ValidationError::MissingField("category"))?;
        let label = label.trim().to_string();
        if label.is_empty() {
            return Err(ValidationError::MissingField("category"));
        }

        Ok(Payload::Category { label })
    }

    fn parse_reading_json(&self, raw: &str) -> Result<Payload, ValidationError> {
        let line: RawReadingLine = serde_json::from_str(raw)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let timestamp = line.timestamp.ok_or(ValidationError::MissingField("timestamp"))?;
        if timestamp.trim().is_empty() {
            return Err(ValidationError::MissingField("timestamp"));
        }

        let value = line.value.ok_or(ValidationError::MissingField("value"))?;
        if !value.is_finite() {
            return Err(ValidationError::InvalidNumber {
                field: "value",
                raw: value.to_string(),
            });
        }

        Ok(Payload::Reading { timestamp, value })
    }

    /// CSV rows are `timestamp,value`. RFC 3339 timestamps carry no commas,
    /// so a plain split is enough.
    fn parse_reading_csv(&self, raw: &str) -> Result<Payload, ValidationError> {
        let fields: Vec<&str> = raw.split(',').collect();
        if fields.len() != 2 {
            return Err(ValidationError::Malformed(format!(
                "expected 2 CSV fields, got {}",
                fields.len()
            )));
        }

        let timestamp = fields[0].trim();
        if timestamp.is_empty() {
            return Err(ValidationError::MissingField("timestamp"));
        }

        let raw_value = fields[1].trim();
        let value: f64 = raw_value.parse().map_err(|_| ValidationError::InvalidNumber {
            field: "value",
            raw: raw_value.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ValidationError::InvalidNumber {
                field: "value",
                raw: raw_value.to_string(),
            });
        }

        Ok(Payload::Reading {
            timestamp: timestamp.to_string(),
            value,
        })
    }
}
