//! Bounded aggregation primitives: FIFO value window and category counter

use serde::Serialize;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingStats {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

/// Mean and population standard deviation in one pass over the values.
pub fn population_stats(values: &[f64]) -> RollingStats {
    let n = values.len();
    if n == 0 {
        return RollingStats {
            mean: 0.0,
            std_dev: 0.0,
            count: 0,
        };
    }

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for v in values {
        sum += v;
        sum_sq += v * v;
    }

    let mean = sum / n as f64;
    // Floating-point cancellation can push the variance a hair below zero.
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);

    RollingStats {
        mean,
        std_dev: variance.sqrt(),
        count: n,
    }
}

/// Fixed-capacity FIFO window of recent values. Insertion at capacity
/// evicts the oldest value first; `len() <= capacity` always holds.
#[derive(Debug, Clone)]
pub struct BoundedWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl BoundedWindow {
    /// Capacity must be positive; the aggregator constructor enforces it.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Owned copy of the window contents, oldest first.
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn stats(&self) -> RollingStats {
        population_stats(&self.values())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy)]
struct CategorySlot {
    count: u64,
    first_seen: u64,
}

/// Running counts per category label. The key set is unbounded; each entry
/// is a plain integer, no per-key window.
#[derive(Debug, Clone, Default)]
pub struct CategoryCounter {
    counts: HashMap<String, CategorySlot>,
    next_seq: u64,
    total: u64,
}

impl CategoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, label: &str) {
        if let Some(slot) = self.counts.get_mut(label) {
            slot.count += 1;
        } else {
            let first_seen = self.next_seq;
            self.next_seq += 1;
            self.counts.insert(
                label.to_string(),
                CategorySlot {
                    count: 1,
                    first_seen,
                },
            );
        }
        self.total += 1;
    }

    /// Top `k` categories by count, descending. Ties break by first-seen
    /// order of the label.
    pub fn top_k(&self, k: usize) -> Vec<CategoryCount> {
        let mut entries: Vec<(&String, &CategorySlot)> = self.counts.iter().collect();
        entries.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });

        entries
            .into_iter()
            .take(k)
            .map(|(label, slot)| CategoryCount {
                label: label.clone(),
                count: slot.count,
            })
            .collect()
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total records folded in across all categories.
    pub fn total(&self) -> u64 {
        self.total
    }
}
