//! Measurement results.
//!
//! A simulator returns a [`MeasurementTable`]: for every measurement key, the
//! outcome observed in each shot. The pipeline folds it into one
//! [`Histogram`] per key and wraps both in an [`ExecutionResult`].
//!
//! All maps are ordered by key so iteration (and anything derived from it,
//! such as tie-breaking) is the same on every platform.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Occurrence count per observed outcome for one measurement key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Histogram(BTreeMap<String, u64>);

impl Histogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `outcome`.
    pub fn record(&mut self, outcome: impl Into<String>, count: u64) {
        *self.0.entry(outcome.into()).or_insert(0) += count;
    }

    /// Count for `outcome` (0 if never observed).
    pub fn get(&self, outcome: &str) -> u64 {
        self.0.get(outcome).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no outcome is recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(outcome, count)` in outcome order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Observed outcomes in order.
    pub fn outcomes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keep only outcomes for which `keep(outcome, count)` is true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, u64) -> bool) {
        self.0.retain(|k, v| keep(k, *v));
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Histogram {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut histogram = Histogram::new();
        for (outcome, count) in iter {
            histogram.record(outcome, count);
        }
        histogram
    }
}

/// One histogram per measurement key.
pub type KeyedCounts = BTreeMap<String, Histogram>;

/// Raw per-shot outcomes, keyed by measurement key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementTable {
    shots: u32,
    records: BTreeMap<String, Vec<u8>>,
}

impl MeasurementTable {
    /// Create an empty table for `shots` shots.
    pub fn new(shots: u32) -> Self {
        Self {
            shots,
            records: BTreeMap::new(),
        }
    }

    /// Number of shots the table was created for.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Declare a key so it appears even before any outcome is pushed.
    pub fn declare(&mut self, key: impl Into<String>) {
        let shots = self.shots as usize;
        self.records
            .entry(key.into())
            .or_insert_with(|| Vec::with_capacity(shots));
    }

    /// Append one shot's outcome for `key`.
    pub fn push(&mut self, key: &str, outcome: u8) {
        if let Some(record) = self.records.get_mut(key) {
            record.push(outcome);
        } else {
            let mut record = Vec::with_capacity(self.shots as usize);
            record.push(outcome);
            self.records.insert(key.to_string(), record);
        }
    }

    /// Per-shot outcomes for `key`.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.records.get(key).map(Vec::as_slice)
    }

    /// Measurement keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fold the per-shot records into one histogram per key.
    pub fn histograms(&self) -> KeyedCounts {
        self.records
            .iter()
            .map(|(key, outcomes)| {
                let histogram: Histogram = outcomes.iter().map(|o| (o.to_string(), 1)).collect();
                (key.clone(), histogram)
            })
            .collect()
    }
}

/// Result of one circuit execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Unique id of this execution, for correlating logs.
    pub execution_id: Uuid,
    /// Histogram per measurement key.
    pub counts: KeyedCounts,
    /// Raw per-shot outcomes.
    pub measurements: MeasurementTable,
    /// Number of shots executed.
    pub shots: u32,
    /// Wall-clock execution time in milliseconds.
    #[serde(default)]
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    /// Build a result from a raw table, deriving the histograms.
    pub fn from_measurements(measurements: MeasurementTable) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            counts: measurements.histograms(),
            shots: measurements.shots(),
            measurements,
            execution_time_ms: 0,
        }
    }

    /// Set execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = ms;
        self
    }

    /// Histogram for `key`.
    pub fn histogram(&self, key: &str) -> Option<&Histogram> {
        self.counts.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_basics() {
        let mut h = Histogram::new();
        h.record("0", 3);
        h.record("1", 5);
        h.record("0", 2);

        assert_eq!(h.get("0"), 5);
        assert_eq!(h.get("11"), 0);
        assert_eq!(h.total(), 10);
        assert_eq!(h.len(), 2);
        assert_eq!(h.outcomes().collect::<Vec<_>>(), ["0", "1"]);
    }

    #[test]
    fn test_table_histograms() {
        let mut table = MeasurementTable::new(4);
        for bit in [0, 1, 1, 1] {
            table.push("q0", bit);
        }
        table.declare("q1");
        for _ in 0..4 {
            table.push("q1", 0);
        }

        let counts = table.histograms();
        assert_eq!(counts["q0"].get("1"), 3);
        assert_eq!(counts["q0"].total(), 4);
        assert_eq!(counts["q1"].get("0"), 4);
        assert_eq!(table.get("q0"), Some(&[0, 1, 1, 1][..]));
    }

    #[test]
    fn test_execution_result_serialization() {
        let mut table = MeasurementTable::new(2);
        table.push("q0", 1);
        table.push("q0", 1);
        let result = ExecutionResult::from_measurements(table).with_execution_time(7);

        let json = serde_json::to_string(&result).unwrap();
        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.histogram("q0").map(Histogram::total), Some(2));
    }
}
