//! Circuit execution against a device.
//!
//! [`execute`] owns the device side of a run: admission, the
//! Ready → Busy → Simulating → Ready walk, and turning the simulator's raw
//! table into per-key histograms. Every failure after admission leaves the
//! device in Error and is returned to the caller.

use std::time::Instant;

use qpu_hal::{
    Device, ExecutionLease, ExecutionResult, MeasurementTable, QpuError, QpuResult, Simulator,
};
use qpu_ir::{CircuitSpec, IrError, NoiseModel};
use tracing::{debug, error, info, instrument, warn};

/// Run `circuit` for `shots` shots on `device` through `simulator`.
#[instrument(
    skip(device, simulator, circuit, noise),
    fields(device = device.name(), simulator = simulator.name(), num_qubits = circuit.num_qubits())
)]
pub async fn execute(
    device: &Device,
    simulator: &dyn Simulator,
    circuit: &CircuitSpec,
    shots: u32,
    noise: Option<&NoiseModel>,
) -> QpuResult<ExecutionResult> {
    if shots == 0 {
        warn!(stage = "validate", "Rejected zero shot count");
        return Err(QpuError::InvalidShotCount(shots));
    }

    // Depth and qubit count never change at calibration.
    let max_depth = device.config().max_circuit_depth;
    if circuit.depth() > max_depth {
        let err = QpuError::InvalidOperation(IrError::DepthExceeded {
            depth: circuit.depth(),
            max_depth,
        });
        warn!(stage = "validate", error = %err, "Rejected circuit");
        return Err(err);
    }

    let mut lease = device.begin_execution().inspect_err(|err| {
        warn!(stage = "admit", error = %err, "Execution not admitted");
    })?;

    let config = device.config();
    if !config.simulation_only {
        return Err(abort(
            lease,
            "admit",
            QpuError::UnsupportedHardwareMode(
                "hardware execution is not available; only simulation is supported".into(),
            ),
        ));
    }
    if circuit.num_qubits() > config.num_qubits {
        let err = QpuError::execution(
            "validate",
            format!(
                "circuit has {} qubits but device {} has {}",
                circuit.num_qubits(),
                device.name(),
                config.num_qubits
            ),
        );
        return Err(abort(lease, "validate", err));
    }
    if circuit.num_qubits() > simulator.max_qubits() {
        let err = QpuError::execution(
            "validate",
            format!(
                "circuit has {} qubits but simulator {} supports {}",
                circuit.num_qubits(),
                simulator.name(),
                simulator.max_qubits()
            ),
        );
        return Err(abort(lease, "validate", err));
    }

    if let Err(err) = lease.start_simulation() {
        return Err(abort(lease, "simulate", err));
    }

    let start = Instant::now();
    let table = match simulator.run(circuit, shots, noise).await {
        Ok(table) => table,
        Err(err) => return Err(abort(lease, "simulate", err)),
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if let Err(err) = check_table(circuit, shots, &table) {
        return Err(abort(lease, "collect", err));
    }

    lease.succeed()?;

    let result = ExecutionResult::from_measurements(table).with_execution_time(elapsed_ms);
    info!(
        execution_id = %result.execution_id,
        shots,
        keys = result.counts.len(),
        elapsed_ms,
        "Execution completed"
    );
    Ok(result)
}

fn abort(lease: ExecutionLease<'_>, stage: &'static str, err: QpuError) -> QpuError {
    error!(stage, error = %err, "Execution failed");
    lease.fail();
    err
}

/// Every measurement key must appear exactly once with one outcome per shot.
fn check_table(circuit: &CircuitSpec, shots: u32, table: &MeasurementTable) -> QpuResult<()> {
    let keys = circuit.measurement_keys();
    if table.len() != keys.len() {
        return Err(QpuError::execution(
            "collect",
            format!("expected {} measurement keys, got {}", keys.len(), table.len()),
        ));
    }
    for key in keys {
        let got = table.get(key).map_or(0, <[u8]>::len);
        if got != shots as usize {
            return Err(QpuError::execution(
                "collect",
                format!("key {key}: expected {shots} outcomes, got {got}"),
            ));
        }
    }
    debug!(keys = keys.len(), "Measurement table complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpu_adapter_sim::StatevectorSimulator;
    use qpu_hal::{DeviceConfig, DeviceStatus};
    use qpu_ir::GateOperation;

    fn bell() -> CircuitSpec {
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

    #[tokio::test]
    async fn test_counts_sum_to_shots() {
        let device = Device::new(DeviceConfig::default());
        let sim = StatevectorSimulator::seeded(11);

        let result = execute(&device, &sim, &bell(), 500, None).await.unwrap();
        assert_eq!(result.shots, 500);
        for key in ["q0", "q1"] {
            assert_eq!(result.counts[key].total(), 500);
        }
        assert_eq!(result.counts["q0"], result.counts["q1"]);
        assert_eq!(device.status(), DeviceStatus::Ready);
        assert_eq!(device.snapshot().executions_completed, 1);
    }

    #[tokio::test]
    async fn test_zero_shots_leaves_status_untouched() {
        let device = Device::new(DeviceConfig::default());
        let sim = StatevectorSimulator::new();

        let err = execute(&device, &sim, &bell(), 0, None).await.unwrap_err();
        assert!(matches!(err, QpuError::InvalidShotCount(0)));
        assert_eq!(device.status(), DeviceStatus::Ready);
    }

    #[tokio::test]
    async fn test_too_wide_for_device() {
        let device = Device::new(DeviceConfig::with_qubits(1));
        let sim = StatevectorSimulator::new();

        let err = execute(&device, &sim, &bell(), 10, None).await.unwrap_err();
        assert!(matches!(err, QpuError::ExecutionFailure { stage: "validate", .. }));
        assert_eq!(device.status(), DeviceStatus::Error);
    }

    #[tokio::test]
    async fn test_too_deep_is_caller_error() {
        let device = Device::new(DeviceConfig {
            max_circuit_depth: 2,
            ..DeviceConfig::default()
        });
        let sim = StatevectorSimulator::new();

        let err = execute(&device, &sim, &bell(), 10, None).await.unwrap_err();
        assert!(matches!(
            err,
            QpuError::InvalidOperation(IrError::DepthExceeded { .. })
        ));
        assert_eq!(device.status(), DeviceStatus::Ready);
    }

    #[tokio::test]
    async fn test_hardware_mode_rejected() {
        let device = Device::new(DeviceConfig {
            simulation_only: false,
            ..DeviceConfig::default()
        });
        let sim = StatevectorSimulator::new();

        let err = execute(&device, &sim, &bell(), 10, None).await.unwrap_err();
        assert!(matches!(err, QpuError::UnsupportedHardwareMode(_)));
        assert_eq!(device.status(), DeviceStatus::Error);
    }
}
