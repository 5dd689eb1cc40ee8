//! QPU Middleware Statevector Simulator
//!
//! The simulation backend behind a simulated QPU. It implements
//! [`qpu_hal::Simulator`] with a full statevector, sampling every shot
//! independently and collapsing the state at each measurement.
//!
//! # Features
//!
//! - **Gate set**: `H`, `X^t`, `Y^t`, `Z^t` (power-gate convention) and `CNOT`
//! - **Mid-circuit measurement**: projective, with collapse
//! - **Noise**: optional per-gate channels and readout error, sampled as
//!   stochastic trajectories
//! - **Reproducibility**: a fixed seed gives identical tables run to run
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 15 | ~512 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//!
//! Without noise the unitary prefix before the first measurement is
//! simulated once and reused by every shot.
//!
//! # Example
//!
//! ```
//! use qpu_adapter_sim::StatevectorSimulator;
//! use qpu_ir::{CircuitSpec, GateOperation};
//!
//! let circuit = CircuitSpec::build(
//!     2,
//!     vec![
//!         GateOperation::h(0u32),
//!         GateOperation::cnot(0u32, 1u32),
//!         GateOperation::measure(0u32),
//!         GateOperation::measure(1u32),
//!     ],
//! )
//! .unwrap();
//!
//! let table = StatevectorSimulator::seeded(42)
//!     .run_blocking(&circuit, 100, None)
//!     .unwrap();
//! assert_eq!(table.get("q0"), table.get("q1"));
//! ```

mod simulator;
mod statevector;

pub use simulator::{MAX_SIMULATOR_QUBITS, SimulatorConfig, StatevectorSimulator};
