//! Interpretation of mitigated counts into application answers.

use qpu_hal::{ExecutionResult, KeyedCounts, QpuError, QpuResult};
use serde::{Deserialize, Serialize};

use crate::mitigation::MitigatedResult;

/// Raw and mitigated results of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedResults {
    /// Unfiltered execution result.
    pub raw: ExecutionResult,
    /// Result after mitigation.
    pub mitigated: MitigatedResult,
}

/// Answer of a pattern-recognition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Whether the confidence exceeds the detection threshold.
    pub pattern_detected: bool,
    /// Largest share of the mitigated grand total held by one key.
    pub confidence: f64,
    /// Results the answer was derived from.
    pub detailed: DetailedResults,
}

/// Answer of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Measurement key with the largest summed count.
    pub optimal_solution: String,
    /// Results the answer was derived from.
    pub detailed: DetailedResults,
}

/// Turns mitigated counts into an answer.
pub trait Interpreter {
    /// Answer type.
    type Output;

    /// Interpret `counts`. Fails with [`QpuError::NoSignal`] when there is
    /// nothing to interpret.
    fn interpret(&self, counts: &KeyedCounts) -> QpuResult<Self::Output>;
}

/// Confidence and detection flag of a pattern-recognition run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternAnalysis {
    /// See [`PatternReport::pattern_detected`].
    pub pattern_detected: bool,
    /// See [`PatternReport::confidence`].
    pub confidence: f64,
}

/// Share-of-total pattern detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternInterpreter {
    /// Confidence must be strictly greater than this.
    pub detection_threshold: f64,
}

impl Default for PatternInterpreter {
    fn default() -> Self {
        Self {
            detection_threshold: 0.6,
        }
    }
}

impl Interpreter for PatternInterpreter {
    type Output = PatternAnalysis;

    fn interpret(&self, counts: &KeyedCounts) -> QpuResult<PatternAnalysis> {
        let grand_total: u64 = counts.values().map(|h| h.total()).sum();
        if grand_total == 0 {
            return Err(QpuError::NoSignal(
                "every mitigated histogram is empty".into(),
            ));
        }

        let confidence = counts
            .values()
            .map(|h| h.total() as f64 / grand_total as f64)
            .fold(0.0, f64::max);

        Ok(PatternAnalysis {
            pattern_detected: confidence > self.detection_threshold,
            confidence,
        })
    }
}

/// Picks the key with the largest summed count.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizationInterpreter;

impl Interpreter for OptimizationInterpreter {
    type Output = String;

    fn interpret(&self, counts: &KeyedCounts) -> QpuResult<String> {
        let mut best: Option<(&str, u64)> = None;
        // Ordered map: on ties the first (smallest) key wins.
        for (key, histogram) in counts {
            if histogram.is_empty() {
                continue;
            }
            let total = histogram.total();
            match best {
                Some((_, t)) if t >= total => {}
                _ => best = Some((key.as_str(), total)),
            }
        }

        best.map(|(key, _)| key.to_string()).ok_or_else(|| {
            QpuError::NoSignal("no measurement key has surviving counts".into())
        })
    }
}
