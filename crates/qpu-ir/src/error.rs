//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors raised while describing or building a circuit.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Gate name is not one of H, X, Y, Z, CNOT, MEASURE.
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Qubit index outside `[0, num_qubits)`.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit circuit (gate: {gate})")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Declared qubit count of the circuit.
        num_qubits: u32,
        /// Gate that referenced the qubit.
        gate: &'static str,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Same qubit used twice in one operation.
    #[error("Duplicate qubit {qubit} in operation (gate: {gate})")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Gate that repeated it.
        gate: &'static str,
    },

    /// Gate exponent is NaN or infinite.
    #[error("Gate '{gate}' has non-finite exponent {value}")]
    InvalidExponent {
        /// Gate carrying the exponent.
        gate: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Two MEASURE operations share a key.
    #[error("Measurement key '{0}' is used more than once")]
    DuplicateMeasurementKey(String),

    /// Circuit is deeper than the configured ceiling.
    #[error("Circuit depth {depth} exceeds maximum {max_depth}")]
    DepthExceeded {
        /// Depth of the rejected circuit.
        depth: usize,
        /// Configured ceiling.
        max_depth: usize,
    },

    /// Template input is wider than the device under `TruncationPolicy::Reject`.
    #[error("Template received {got} inputs but only {max} qubits are available")]
    TooManyInputs {
        /// Number of inputs supplied.
        got: usize,
        /// Number of qubits available.
        max: u32,
    },

    /// Noise channel probability outside `[0, 1]`.
    #[error("Noise parameter for {channel} must be within [0, 1], got {value}")]
    InvalidNoiseParameter {
        /// Channel name.
        channel: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
