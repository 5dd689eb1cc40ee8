//! Service facade over one device.

use std::sync::Arc;
use std::time::Duration;

use qpu_adapter_sim::StatevectorSimulator;
use qpu_hal::{Device, DeviceStatus, ExecutionResult, QpuError, QpuResult, Simulator};
use qpu_ir::template::{TemplateCircuit, encode_and_entangle, superpose_and_mix};
use qpu_ir::{CircuitBuilder, CircuitSpec};
use tracing::{error, info, instrument, warn};

use crate::config::RuntimeConfig;
use crate::executor;
use crate::interpret::{
    DetailedResults, Interpreter, OptimizationInterpreter, OptimizationReport, PatternInterpreter,
    PatternReport,
};
use crate::mitigation::{Mitigator, ThresholdMitigation};

/// Entry point for callers of the pipeline.
///
/// Binds one [`Device`] to a [`Simulator`], a [`Mitigator`] and a
/// [`RuntimeConfig`]. The device is shared by `Arc`, so several services (or
/// other owners) may drive the same device; admission is still one execution
/// at a time.
pub struct QpuService {
    device: Arc<Device>,
    simulator: Arc<dyn Simulator>,
    mitigator: Box<dyn Mitigator>,
    config: RuntimeConfig,
}

impl QpuService {
    /// Create a service with a fresh device and the statevector simulator.
    pub fn new(config: RuntimeConfig) -> QpuResult<Self> {
        config.validate()?;
        let device = Arc::new(Device::new(config.device.clone()));
        let simulator = Arc::new(StatevectorSimulator::with_config(config.simulator.clone()));
        Ok(Self::with_parts(device, simulator, config))
    }

    /// Create a service from existing parts.
    ///
    /// `config.device` is ignored; the device keeps its own configuration.
    pub fn with_parts(
        device: Arc<Device>,
        simulator: Arc<dyn Simulator>,
        config: RuntimeConfig,
    ) -> Self {
        info!(
            device = device.name(),
            simulator = simulator.name(),
            "Created QPU service"
        );
        Self {
            device,
            simulator,
            mitigator: Box::new(ThresholdMitigation),
            config,
        }
    }

    /// Replace the mitigation method.
    #[must_use]
    pub fn with_mitigator(mut self, mitigator: impl Mitigator + 'static) -> Self {
        self.mitigator = Box::new(mitigator);
        self
    }

    /// Get the device.
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// Get the runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current device status. No side effects.
    pub fn check_status(&self) -> DeviceStatus {
        self.device.status()
    }

    /// Reset the device to nominal error rate and fidelities.
    ///
    /// Returns `false` if calibration was refused or failed; the reason is
    /// logged.
    #[instrument(skip(self), fields(device = self.device.name()))]
    pub fn calibrate(&self) -> bool {
        match self.device.calibrate() {
            Ok(()) => true,
            Err(err) => {
                error!(stage = "calibrate", error = %err, "Calibration failed");
                false
            }
        }
    }

    /// Execute a circuit with the configured noise model.
    pub async fn execute(&self, circuit: &CircuitSpec, shots: u32) -> QpuResult<ExecutionResult> {
        executor::execute(
            &self.device,
            self.simulator.as_ref(),
            circuit,
            shots,
            self.config.noise.as_ref(),
        )
        .await
    }

    /// Execute a circuit and mitigate its counts.
    ///
    /// The error rate is read from the device after execution.
    pub async fn execute_with_mitigation(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
    ) -> QpuResult<DetailedResults> {
        let raw = self.execute(circuit, shots).await?;
        let error_rate = self.device.config().error_rate;
        let mitigated = self.mitigator.mitigate(&raw, error_rate);
        Ok(DetailedResults { raw, mitigated })
    }

    /// Execute a circuit, giving up after `timeout`.
    ///
    /// On expiry the in-flight execution is abandoned, which moves the device
    /// to Error; a late result from the simulator is discarded.
    pub async fn execute_with_timeout(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
        timeout: Duration,
    ) -> QpuResult<ExecutionResult> {
        match tokio::time::timeout(timeout, self.execute(circuit, shots)).await {
            Ok(result) => result,
            Err(_) => {
                error!(stage = "simulate", ?timeout, "Execution timed out");
                Err(QpuError::Timeout(timeout))
            }
        }
    }

    /// Encode `input` and report how strongly one qubit dominates the
    /// mitigated counts.
    #[instrument(skip(self, input), fields(inputs = input.len()))]
    pub async fn run_pattern_recognition(
        &self,
        input: &[f64],
        shots: u32,
    ) -> QpuResult<PatternReport> {
        let template = encode_and_entangle(
            input,
            self.device.config().num_qubits,
            self.config.pattern.layers,
            self.config.truncation,
        )?;
        let circuit = self.assemble(template)?;

        let detailed = self.execute_with_mitigation(&circuit, shots).await?;
        let interpreter = PatternInterpreter {
            detection_threshold: self.config.pattern.detection_threshold,
        };
        let analysis = interpreter
            .interpret(&detailed.mitigated.counts)
            .inspect_err(|err| warn!(stage = "interpret", error = %err, "No pattern signal"))?;

        info!(
            confidence = analysis.confidence,
            detected = analysis.pattern_detected,
            "Pattern recognition completed"
        );
        Ok(PatternReport {
            pattern_detected: analysis.pattern_detected,
            confidence: analysis.confidence,
            detailed,
        })
    }

    /// Mix `parameters` and report the measurement key with the most
    /// surviving counts.
    #[instrument(skip(self, parameters), fields(inputs = parameters.len()))]
    pub async fn run_optimization(
        &self,
        parameters: &[f64],
        shots: u32,
    ) -> QpuResult<OptimizationReport> {
        let template = superpose_and_mix(
            parameters,
            self.device.config().num_qubits,
            self.config.optimization.iterations,
            self.config.truncation,
        )?;
        let circuit = self.assemble(template)?;

        let detailed = self.execute_with_mitigation(&circuit, shots).await?;
        let optimal_solution = OptimizationInterpreter
            .interpret(&detailed.mitigated.counts)
            .inspect_err(|err| warn!(stage = "interpret", error = %err, "No optimization signal"))?;

        info!(solution = %optimal_solution, "Optimization completed");
        Ok(OptimizationReport {
            optimal_solution,
            detailed,
        })
    }

    fn assemble(&self, template: TemplateCircuit) -> QpuResult<CircuitSpec> {
        if template.dropped_inputs > 0 {
            warn!(
                dropped = template.dropped_inputs,
                active_qubits = template.active_qubits,
                "Input wider than device; excess values truncated"
            );
        }
        let circuit = CircuitBuilder::new(template.active_qubits)
            .max_depth(self.device.config().max_circuit_depth)
            .extend(template.operations)
            .build()?;
        Ok(circuit)
    }
}

impl std::fmt::Debug for QpuService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QpuService")
            .field("device", &self.device)
            .field("simulator", &self.simulator.name())
            .field("mitigator", &self.mitigator.name())
            .finish()
    }
}
