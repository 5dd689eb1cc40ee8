//! QPU Middleware Circuit Model
//!
//! This crate describes what the simulated QPU is asked to do: individual
//! gate applications, the circuits built from them, the two canonical
//! circuit templates and the noise a simulator may apply.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] addresses a qubit; its display form (`q0`) is the
//!   default measurement key
//! - **Gates**: [`GateOperation`] is a closed set of gate applications;
//!   [`OperationSpec`] is the open form accepted from callers
//! - **Circuits**: [`CircuitBuilder`] validates operations into an immutable
//!   [`CircuitSpec`]
//! - **Templates**: [`template::encode_and_entangle`] and
//!   [`template::superpose_and_mix`]
//! - **Noise**: [`NoiseModel`] and [`NoiseChannel`]
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qpu_ir::{CircuitSpec, GateOperation, QubitId};
//!
//! let circuit = CircuitSpec::build(
//!     2,
//!     vec![
//!         GateOperation::h(QubitId(0)),
//!         GateOperation::cnot(QubitId(0), QubitId(1)),
//!         GateOperation::measure(QubitId(0)),
//!         GateOperation::measure(QubitId(1)),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates, optionally raised to a real exponent |
//! | `CNOT` | 2 | Controlled-NOT |
//! | `MEASURE` | 1 | Computational-basis measurement under a key |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod noise;
pub mod qubit;
pub mod template;

pub use circuit::{CircuitBuilder, CircuitSpec};
pub use error::{IrError, IrResult};
pub use gate::{GateOperation, OperationSpec};
pub use noise::{NoiseChannel, NoiseModel};
pub use qubit::QubitId;
pub use template::{TemplateCircuit, TruncationPolicy};
