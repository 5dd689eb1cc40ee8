//! Error mitigation.
//!
//! A [`Mitigator`] cleans the raw histograms of an execution before they are
//! interpreted. The built-in [`ThresholdMitigation`] drops every outcome that
//! occurs no more often than the device error rate would explain.

use qpu_hal::{ExecutionResult, Histogram, KeyedCounts};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Histograms after mitigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigatedResult {
    /// Surviving counts per measurement key. A key whose outcomes were all
    /// dropped maps to an empty histogram.
    pub counts: KeyedCounts,
    /// Error rate the filter ran with.
    pub error_rate: f64,
    /// Shots of the underlying execution.
    pub shots: u32,
}

impl MitigatedResult {
    /// Check if every histogram is empty.
    pub fn is_empty(&self) -> bool {
        self.counts.values().all(Histogram::is_empty)
    }

    /// Sum of surviving counts over all keys.
    pub fn total(&self) -> u64 {
        self.counts.values().map(Histogram::total).sum()
    }

    /// Histogram for `key`.
    pub fn histogram(&self, key: &str) -> Option<&Histogram> {
        self.counts.get(key)
    }
}

/// Post-processing that removes noise from measured counts.
pub trait Mitigator: Send + Sync {
    /// Get the name of this mitigation method.
    fn name(&self) -> &str;

    /// Mitigate raw counts given the device's current error rate.
    fn mitigate_counts(&self, counts: &KeyedCounts, error_rate: f64) -> KeyedCounts;

    /// Mitigate the counts of an execution.
    fn mitigate(&self, result: &ExecutionResult, error_rate: f64) -> MitigatedResult {
        MitigatedResult {
            counts: self.mitigate_counts(&result.counts, error_rate),
            error_rate,
            shots: result.shots,
        }
    }
}

/// Drops outcomes whose count is not strictly greater than
/// `total(key) * error_rate`, independently for each key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdMitigation;

impl Mitigator for ThresholdMitigation {
    fn name(&self) -> &str {
        "threshold"
    }

    fn mitigate_counts(&self, counts: &KeyedCounts, error_rate: f64) -> KeyedCounts {
        counts
            .iter()
            .map(|(key, histogram)| {
                let threshold = histogram.total() as f64 * error_rate;
                let mut kept = histogram.clone();
                kept.retain(|_, count| count as f64 > threshold);
                if kept.len() < histogram.len() {
                    debug!(
                        key = %key,
                        threshold,
                        dropped = histogram.len() - kept.len(),
                        "Dropped outcomes below noise threshold"
                    );
                }
                (key.clone(), kept)
            })
            .collect()
    }
}
