//! Synthetic record generation for the demo producer

use crate::config::{AggregationMode, WireFormat};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const CATEGORIES: &[&str] = &["Alice", "Bob", "Charlie", "Eve", "Mallory", "Trent"];

const MESSAGES: &[&str] = &[
    "I just saw a movie! It was amazing.",
    "Trying a new recipe tonight.",
    "Finally finished that book.",
    "Anyone up for a hike this weekend?",
    "The coffee here is excellent.",
    "Just shipped a new release!",
];

#[derive(Debug, Serialize)]
struct CategoryEvent<'a> {
    category: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ReadingEvent {
    timestamp: String,
    value: f64,
}

/// Emits one wire-format line per call: category events sampled from fixed
/// pools, or sensor readings following a bounded random walk with rare
/// spikes so the deviation alert has something to find.
pub struct RecordGenerator {
    mode: AggregationMode,
    wire_format: WireFormat,
    rng: StdRng,
    current_value: f64,
}

impl RecordGenerator {
    pub fn new(mode: AggregationMode, wire_format: WireFormat) -> Self {
        Self::from_rng(mode, wire_format, StdRng::from_entropy())
    }

    /// Deterministic generator for tests.
    pub fn with_seed(mode: AggregationMode, wire_format: WireFormat, seed: u64) -> Self {
        Self::from_rng(mode, wire_format, StdRng::seed_from_u64(seed))
    }

    fn from_rng(mode: AggregationMode, wire_format: WireFormat, rng: StdRng) -> Self {
        Self {
            mode,
            wire_format,
            rng,
            current_value: 180.0,
        }
    }

    pub fn next_line(&mut self) -> Result<String, serde_json::Error> {
        match self.mode {
            AggregationMode::TopKCategory => {
                let category = CATEGORIES[self.rng.gen_range(0..CATEGORIES.len())];
                let message = MESSAGES[self.rng.gen_range(0..MESSAGES.len())];
                serde_json::to_string(&CategoryEvent { category, message })
            }
            AggregationMode::RollingWindow => {
                let value = self.next_reading();
                let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

                match self.wire_format {
                    WireFormat::Json => {
                        serde_json::to_string(&ReadingEvent { timestamp, value })
                    }
                    WireFormat::Csv => Ok(format!("{},{:.1}", timestamp, value)),
                }
            }
        }
    }

    fn next_reading(&mut self) -> f64 {
        let step: f64 = self.rng.gen_range(-1.5..1.5);
        self.current_value = (self.current_value + step).clamp(150.0, 250.0);

        // Rare transient spike, not folded into the walk.
        if self.rng.gen_bool(0.02) {
            return (self.current_value + self.rng.gen_range(40.0..80.0)).min(400.0);
        }

        (self.current_value * 10.0).round() / 10.0
    }
}
