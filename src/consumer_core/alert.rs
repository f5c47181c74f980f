//! Stateless deviation alerting over rolling snapshots

use super::aggregator::Snapshot;
use super::window::population_stats;
use serde::Serialize;

/// Pass/fail signal derived from one snapshot. Never persisted, never
/// owned by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl Alert {
    pub fn none() -> Self {
        Self {
            triggered: false,
            reason: None,
            value: None,
            threshold: None,
        }
    }

    fn deviation(value: f64, threshold: f64) -> Self {
        Self {
            triggered: true,
            reason: Some("deviation".to_string()),
            value: Some(value),
            threshold: Some(threshold),
        }
    }
}

/// Flags a sample that strays from the rolling baseline by more than
/// `multiplier` standard deviations. Pure function of its inputs, no
/// state between calls.
pub struct AlertEvaluator {
    multiplier: f64,
    min_samples: usize,
}

impl AlertEvaluator {
    pub fn new(multiplier: f64, min_samples: usize) -> Self {
        Self {
            multiplier,
            min_samples,
        }
    }

    pub fn evaluate(&self, snapshot: &Snapshot) -> Alert {
        let (values, latest) = match snapshot {
            Snapshot::Rolling { values, latest, .. } => (values.as_slice(), *latest),
            // No alerting is defined over category counts.
            Snapshot::TopK { .. } => return Alert::none(),
        };

        if values.len() < self.min_samples {
            return Alert::none();
        }

        // The newest sample is tested against the preceding baseline; a
        // spike must not inflate the threshold it is measured against.
        let baseline = match values.split_last() {
            Some((_, baseline)) if !baseline.is_empty() => baseline,
            _ => return Alert::none(),
        };

        let stats = population_stats(baseline);
        let threshold = self.multiplier * stats.std_dev;

        if (latest - stats.mean).abs() > threshold {
            Alert::deviation(latest, threshold)
        } else {
            Alert::none()
        }
    }
}
