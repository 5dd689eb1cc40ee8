//! Test simulators that misbehave on purpose.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use qpu_adapter_sim::StatevectorSimulator;
use qpu_hal::{MeasurementTable, QpuError, QpuResult, Simulator};
use qpu_ir::{CircuitSpec, GateOperation, NoiseModel};

pub fn bell() -> CircuitSpec {
    CircuitSpec::build(
        2,
        vec![
            GateOperation::h(0u32),
            GateOperation::cnot(0u32, 1u32),
            GateOperation::measure(0u32),
            GateOperation::measure(1u32),
        ],
    )
    .unwrap()
}

/// Fails every run.
pub struct FailingSimulator;

#[async_trait]
impl Simulator for FailingSimulator {
    fn name(&self) -> &str {
        "failing"
    }

    fn max_qubits(&self) -> u32 {
        20
    }

    async fn run(
        &self,
        _circuit: &CircuitSpec,
        _shots: u32,
        _noise: Option<&NoiseModel>,
    ) -> QpuResult<MeasurementTable> {
        Err(QpuError::execution("simulate", "injected fault"))
    }
}

/// Returns one outcome fewer than requested.
pub struct ShortSimulator;

#[async_trait]
impl Simulator for ShortSimulator {
    fn name(&self) -> &str {
        "short"
    }

    fn max_qubits(&self) -> u32 {
        20
    }

    async fn run(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
        _noise: Option<&NoiseModel>,
    ) -> QpuResult<MeasurementTable> {
        let mut table = MeasurementTable::new(shots);
        for key in circuit.measurement_keys() {
            for _ in 1..shots {
                table.push(key, 0);
            }
        }
        Ok(table)
    }
}

/// Sleeps before delegating to the statevector simulator.
pub struct SlowSimulator {
    pub delay: Duration,
    pub inner: StatevectorSimulator,
}

#[async_trait]
impl Simulator for SlowSimulator {
    fn name(&self) -> &str {
        "slow"
    }

    fn max_qubits(&self) -> u32 {
        self.inner.config().max_qubits
    }

    async fn run(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
        noise: Option<&NoiseModel>,
    ) -> QpuResult<MeasurementTable> {
        tokio::time::sleep(self.delay).await;
        self.inner.run(circuit, shots, noise).await
    }
}

/// Signals when a run starts and waits to be released.
#[derive(Default)]
pub struct GatedSimulator {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
    pub inner: StatevectorSimulator,
}

#[async_trait]
impl Simulator for GatedSimulator {
    fn name(&self) -> &str {
        "gated"
    }

    fn max_qubits(&self) -> u32 {
        self.inner.config().max_qubits
    }

    async fn run(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
        noise: Option<&NoiseModel>,
    ) -> QpuResult<MeasurementTable> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.run(circuit, shots, noise).await
    }
}
