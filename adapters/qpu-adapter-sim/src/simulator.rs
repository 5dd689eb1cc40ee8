//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use qpu_hal::{MeasurementTable, QpuError, QpuResult, Simulator};
use qpu_ir::{CircuitSpec, GateOperation, NoiseModel};

use crate::statevector::Statevector;

/// Widest circuit any [`StatevectorSimulator`] runs, whatever its config says.
///
/// The statevector holds `2^n` amplitudes of 16 bytes each; 30 qubits is
/// already 16 GiB.
pub const MAX_SIMULATOR_QUBITS: u32 = 30;

/// Settings of a [`StatevectorSimulator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Widest circuit accepted.
    pub max_qubits: u32,
    /// Fixed RNG seed; `None` draws from OS entropy on every run.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: 20,
            seed: None,
        }
    }
}

/// Local statevector simulator.
///
/// Each shot starts from |0...0⟩, applies the circuit in order, and collapses
/// the state at every MEASURE. It supports circuits up to ~20 qubits
/// (limited by memory).
#[derive(Debug, Clone, Default)]
pub struct StatevectorSimulator {
    config: SimulatorConfig,
}

impl SimulatorConfig {
    /// Check that `max_qubits` is within `1..=MAX_SIMULATOR_QUBITS`.
    pub fn validate(&self) -> QpuResult<()> {
        if self.max_qubits == 0 || self.max_qubits > MAX_SIMULATOR_QUBITS {
            return Err(QpuError::Configuration(format!(
                "simulator.max_qubits must be within 1..={MAX_SIMULATOR_QUBITS}, got {}",
                self.max_qubits
            )));
        }
        Ok(())
    }

    /// Configured width, clamped to [`MAX_SIMULATOR_QUBITS`].
    pub fn effective_max_qubits(&self) -> u32 {
        self.max_qubits.min(MAX_SIMULATOR_QUBITS)
    }
}

impl StatevectorSimulator {
    /// Create a new simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulator from explicit settings.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Create a simulator whose runs are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::with_config(SimulatorConfig {
            seed: Some(seed),
            ..SimulatorConfig::default()
        })
    }

    /// Get the simulator settings.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit, noise), fields(num_qubits = circuit.num_qubits()))]
    pub fn run_blocking(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
        noise: Option<&NoiseModel>,
    ) -> QpuResult<MeasurementTable> {
        let max_qubits = self.config.effective_max_qubits();
        if circuit.num_qubits() > max_qubits {
            return Err(QpuError::execution(
                "validate",
                format!(
                    "circuit has {} qubits but simulator only supports {max_qubits}",
                    circuit.num_qubits(),
                ),
            ));
        }

        let start = Instant::now();
        let mut rng = self.rng();
        let mut table = MeasurementTable::new(shots);
        for key in circuit.measurement_keys() {
            table.declare(key.clone());
        }

        let num_qubits = circuit.num_qubits() as usize;
        let noise = noise.filter(|n| !n.is_ideal());
        match noise {
            None => {
                // The unitary prefix is identical for every shot.
                let split = circuit
                    .operations()
                    .iter()
                    .position(GateOperation::is_measure)
                    .unwrap_or(circuit.len());
                let (prefix, rest) = circuit.operations().split_at(split);
                let mut prepared = Statevector::new(num_qubits);
                for op in prefix {
                    prepared.apply(op);
                }
                for _ in 0..shots {
                    let mut sv = prepared.clone();
                    run_shot(&mut sv, rest, None, &mut rng, &mut table);
                }
            }
            Some(model) => {
                for _ in 0..shots {
                    let mut sv = Statevector::new(num_qubits);
                    run_shot(&mut sv, circuit.operations(), Some(model), &mut rng, &mut table);
                }
            }
        }

        debug!(
            shots,
            keys = table.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Simulation completed"
        );
        Ok(table)
    }
}

fn run_shot<R: Rng + ?Sized>(
    sv: &mut Statevector,
    operations: &[GateOperation],
    noise: Option<&NoiseModel>,
    rng: &mut R,
    table: &mut MeasurementTable,
) {
    for op in operations {
        if let GateOperation::Measure { qubit, .. } = op {
            let mut bit = sv.measure(qubit.index(), rng);
            if let Some(model) = noise {
                if rng.r#gen::<f64>() < model.readout_error {
                    bit ^= 1;
                }
            }
            if let Some(key) = op.measurement_key() {
                table.push(&key, bit);
            }
            continue;
        }

        sv.apply(op);
        if let Some(model) = noise {
            for qubit in op.qubits() {
                for channel in &model.gate_channels {
                    sv.apply_channel(channel, qubit.index(), rng);
                }
            }
        }
    }
}

#[async_trait]
impl Simulator for StatevectorSimulator {
    fn name(&self) -> &str {
        "statevector"
    }

    fn max_qubits(&self) -> u32 {
        self.config.effective_max_qubits()
    }

    #[instrument(skip(self, circuit, noise))]
    async fn run(
        &self,
        circuit: &CircuitSpec,
        shots: u32,
        noise: Option<&NoiseModel>,
    ) -> QpuResult<MeasurementTable> {
        let simulator = self.clone();
        let circuit = circuit.clone();
        let noise = noise.cloned();
        tokio::task::spawn_blocking(move || simulator.run_blocking(&circuit, shots, noise.as_ref()))
            .await
            .map_err(|e| QpuError::execution("simulate", e.to_string()))?
    }
}
