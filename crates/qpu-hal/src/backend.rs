//! Simulator boundary.
//!
//! [`Simulator`] is the only seam where a different simulation backend can be
//! plugged in. It runs a validated circuit and hands back raw per-shot
//! outcomes; device status, histogramming and mitigation stay on the
//! pipeline side.
//!
//! ## Contract
//!
//! | Method | Kind | Returns |
//! |--------|------|---------|
//! | `name()` | sync | `&str` |
//! | `max_qubits()` | sync | `u32` |
//! | `run()` | async | `QpuResult<MeasurementTable>` |
//!
//! - `run()` MUST return exactly `shots` outcomes for every measurement key of
//!   the circuit, and no other keys.
//! - `run()` MUST apply `noise` when it is `Some`, and only then.
//! - Faults are reported as [`QpuError::ExecutionFailure`](crate::QpuError).

use async_trait::async_trait;
use qpu_ir::{CircuitSpec, NoiseModel};

use crate::error::QpuResult;
use crate::result::MeasurementTable;

/// Trait for simulation backends.
#[async_trait]
pub trait Simulator: Send + Sync {
    /// Get the name of this simulator.
    fn name(&self) -> &str;

    /// Widest circuit this simulator accepts.
    fn max_qubits(&self) -> u32;

    /// Run `circuit` for `shots` repetitions.
    async fn run(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
        noise: Option<&NoiseModel>,
    ) -> QpuResult<MeasurementTable>;
}
