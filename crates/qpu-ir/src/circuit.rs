//! Circuit builder.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{GateOperation, OperationSpec};
use crate::qubit::QubitId;

/// A validated, immutable circuit.
///
/// Only [`CircuitBuilder`] creates these, so every `CircuitSpec` in the
/// pipeline has in-range, duplicate-free operands and unique measurement
/// keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitSpec {
    num_qubits: u32,
    operations: Vec<GateOperation>,
    depth: usize,
    measurement_keys: Vec<String>,
}

impl CircuitSpec {
    /// Build a circuit with no depth ceiling.
    pub fn build(
        num_qubits: u32,
        operations: impl IntoIterator<Item = GateOperation>,
    ) -> IrResult<Self> {
        CircuitBuilder::new(num_qubits).extend(operations).build()
    }

    /// Build a circuit from caller-supplied operation specs.
    pub fn from_specs(
        num_qubits: u32,
        specs: impl IntoIterator<Item = OperationSpec>,
    ) -> IrResult<Self> {
        let operations = specs
            .into_iter()
            .map(GateOperation::try_from)
            .collect::<IrResult<Vec<_>>>()?;
        Self::build(num_qubits, operations)
    }

    /// Declared qubit count.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Operations in application order.
    pub fn operations(&self) -> &[GateOperation] {
        &self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the circuit has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Circuit depth (number of moments).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Measurement keys in circuit order.
    pub fn measurement_keys(&self) -> &[String] {
        &self.measurement_keys
    }

    /// Highest qubit index touched by any operation, if any.
    pub fn max_qubit(&self) -> Option<QubitId> {
        self.operations
            .iter()
            .flat_map(GateOperation::qubits)
            .max()
    }
}

/// Incremental builder for [`CircuitSpec`].
///
/// ```rust
/// use qpu_ir::{CircuitBuilder, GateOperation, QubitId};
///
/// let circuit = CircuitBuilder::new(2)
///     .max_depth(10)
///     .push(GateOperation::h(QubitId(0)))
///     .push(GateOperation::cnot(QubitId(0), QubitId(1)))
///     .push(GateOperation::measure(QubitId(0)))
///     .push(GateOperation::measure(QubitId(1)))
///     .build()
///     .unwrap();
///
/// assert_eq!(circuit.depth(), 3);
/// assert_eq!(circuit.measurement_keys(), ["q0", "q1"]);
/// ```
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    num_qubits: u32,
    max_depth: Option<usize>,
    operations: Vec<GateOperation>,
}

impl CircuitBuilder {
    /// Start a circuit over `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            max_depth: None,
            operations: vec![],
        }
    }

    /// Reject circuits deeper than `max_depth`.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Append one operation.
    #[must_use]
    pub fn push(mut self, operation: GateOperation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Append several operations.
    #[must_use]
    pub fn extend(mut self, operations: impl IntoIterator<Item = GateOperation>) -> Self {
        self.operations.extend(operations);
        self
    }

    /// Validate and freeze the circuit.
    pub fn build(self) -> IrResult<CircuitSpec> {
        let mut layers = vec![0usize; self.num_qubits as usize];
        let mut depth = 0;
        let mut seen_keys = FxHashSet::default();
        let mut measurement_keys = vec![];

        for op in &self.operations {
            op.validate(self.num_qubits)?;

            let qubits = op.qubits();
            let layer = qubits.iter().map(|q| layers[q.index()]).max().unwrap_or(0) + 1;
            for q in &qubits {
                layers[q.index()] = layer;
            }
            depth = depth.max(layer);

            if let Some(key) = op.measurement_key() {
                if !seen_keys.insert(key.clone()) {
                    return Err(IrError::DuplicateMeasurementKey(key));
                }
                measurement_keys.push(key);
            }
        }

        if let Some(max_depth) = self.max_depth {
            if depth > max_depth {
                return Err(IrError::DepthExceeded { depth, max_depth });
            }
        }

        Ok(CircuitSpec {
            num_qubits: self.num_qubits,
            operations: self.operations,
            depth,
            measurement_keys,
        })
    }
}

/// Serialized circuits are re-validated on the way in.
impl<'de> Deserialize<'de> for CircuitSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            num_qubits: u32,
            operations: Vec<GateOperation>,
        }

        let raw = Raw::deserialize(deserializer)?;
        CircuitSpec::build(raw.num_qubits, raw.operations).map_err(serde::de::Error::custom)
    }
}
