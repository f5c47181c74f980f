//! Mode-fixed aggregation over normalized records
//!
//! The aggregator is an explicit instance owned by the ingestion loop; the
//! window behind it is never shared. Every update hands back a fresh owned
//! [`Snapshot`], so readers can never observe the window mid-mutation.

use super::normalizer::{Payload, Record};
use super::window::{BoundedWindow, CategoryCount, CategoryCounter};
use crate::config::{AggregationMode, ConfigError, ConsumerConfig};
use serde::Serialize;

/// Immutable point-in-time view of the aggregated state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    TopK {
        entries: Vec<CategoryCount>,
        total_records: u64,
    },
    Rolling {
        /// Window contents, oldest first.
        values: Vec<f64>,
        latest: f64,
        mean: f64,
        std_dev: f64,
    },
}

pub enum Aggregator {
    TopK { counter: CategoryCounter, k: usize },
    Rolling { window: BoundedWindow },
}

impl Aggregator {
    /// Zero capacity has no defined aggregation semantics; fail at
    /// construction, never at update time.
    pub fn top_k(k: usize) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::InvalidValue(
                "top_k must be a positive integer".to_string(),
            ));
        }

        Ok(Aggregator::TopK {
            counter: CategoryCounter::new(),
            k,
        })
    }

    pub fn rolling(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "window_capacity must be a positive integer".to_string(),
            ));
        }

        Ok(Aggregator::Rolling {
            window: BoundedWindow::new(capacity),
        })
    }

    pub fn from_config(config: &ConsumerConfig) -> Result<Self, ConfigError> {
        match config.mode {
            AggregationMode::TopKCategory => Self::top_k(config.top_k),
            AggregationMode::RollingWindow => Self::rolling(config.window_capacity),
        }
    }

    pub fn mode(&self) -> AggregationMode {
        match self {
            Aggregator::TopK { .. } => AggregationMode::TopKCategory,
            Aggregator::Rolling { .. } => AggregationMode::RollingWindow,
        }
    }

    /// Fold one record into the aggregation and emit the resulting snapshot.
    ///
    /// Total over well-formed records. A payload of the wrong mode cannot
    /// come from the paired normalizer; if one shows up anyway it is logged
    /// and ignored, leaving the state untouched.
    pub fn update(&mut self, record: &Record) -> Snapshot {
        match self {
            Aggregator::TopK { counter, k } => {
                match &record.payload {
                    Payload::Category { label } => counter.increment(label),
                    other => log::warn!(
                        "Ignoring {} payload: aggregator runs in top_k_category mode",
                        other.kind()
                    ),
                }

                Snapshot::TopK {
                    entries: counter.top_k(*k),
                    total_records: counter.total(),
                }
            }
            Aggregator::Rolling { window } => {
                match &record.payload {
                    Payload::Reading { value, .. } => window.push(*value),
                    other => log::warn!(
                        "Ignoring {} payload: aggregator runs in rolling_window mode",
                        other.kind()
                    ),
                }

                let stats = window.stats();
                Snapshot::Rolling {
                    values: window.values(),
                    latest: window.latest().unwrap_or(0.0),
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                }
            }
        }
    }

    /// Current state without folding in a record.
    pub fn snapshot(&self) -> Snapshot {
        match self {
            Aggregator::TopK { counter, k } => Snapshot::TopK {
                entries: counter.top_k(*k),
                total_records: counter.total(),
            },
            Aggregator::Rolling { window } => {
                let stats = window.stats();
                Snapshot::Rolling {
                    values: window.values(),
                    latest: window.latest().unwrap_or(0.0),
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_record(label: &str) -> Record {
        Record {
            received_at: 1_700_000_000,
            payload: Payload::Category {
                label: label.to_string(),
            },
        }
    }

    fn reading_record(value: f64) -> Record {
        Record {
            received_at: 1_700_000_000,
            payload: Payload::Reading {
                timestamp: "2025-01-11T18:15:00Z".to_string(),
                value,
            },
        }
    }

    #[test]
    fn test_zero_capacity_fails_at_construction() {
        assert!(Aggregator::rolling(0).is_err());
        assert!(Aggregator::top_k(0).is_err());
    }

    #[test]
    fn test_top_k_snapshot_ordering() {
        let mut agg = Aggregator::top_k(2).unwrap();

        let mut snapshot = agg.snapshot();
        for label in ["A", "A", "A", "A", "A", "B", "B", "B", "C", "C", "C", "D"] {
            snapshot = agg.update(&category_record(label));
        }

        match snapshot {
            Snapshot::TopK {
                entries,
                total_records,
            } => {
                assert_eq!(total_records, 12);
                assert_eq!(entries.len(), 2);
                assert_eq!((entries[0].label.as_str(), entries[0].count), ("A", 5));
                assert_eq!((entries[1].label.as_str(), entries[1].count), ("B", 3));
            }
            Snapshot::Rolling { .. } => panic!("expected top-k snapshot"),
        }
    }

    #[test]
    fn test_rolling_snapshot_after_eviction() {
        let mut agg = Aggregator::rolling(3).unwrap();

        let mut snapshot = agg.snapshot();
        for value in [1.0, 2.0, 3.0, 4.0] {
            snapshot = agg.update(&reading_record(value));
        }

        match snapshot {
            Snapshot::Rolling {
                values,
                latest,
                mean,
                ..
            } => {
                assert_eq!(values, vec![2.0, 3.0, 4.0]);
                assert_eq!(latest, 4.0);
                assert!((mean - 3.0).abs() < 1e-9);
            }
            Snapshot::TopK { .. } => panic!("expected rolling snapshot"),
        }
    }

    #[test]
    fn test_snapshot_is_an_independent_copy() {
        let mut agg = Aggregator::rolling(4).unwrap();
        agg.update(&reading_record(10.0));

        let mut stolen = agg.update(&reading_record(20.0));
        if let Snapshot::Rolling { values, .. } = &mut stolen {
            values.clear();
            values.push(999.0);
        }

        // Mutating the returned snapshot must not affect later updates.
        match agg.update(&reading_record(30.0)) {
            Snapshot::Rolling { values, .. } => assert_eq!(values, vec![10.0, 20.0, 30.0]),
            Snapshot::TopK { .. } => panic!("expected rolling snapshot"),
        }
    }

    #[test]
    fn test_mismatched_payload_leaves_state_unchanged() {
        let mut agg = Aggregator::rolling(4).unwrap();
        agg.update(&reading_record(10.0));

        match agg.update(&category_record("oops")) {
            Snapshot::Rolling { values, .. } => assert_eq!(values, vec![10.0]),
            Snapshot::TopK { .. } => panic!("expected rolling snapshot"),
        }
    }
}
