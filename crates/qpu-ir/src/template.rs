//! Canonical circuit templates.
//!
//! Templates are recipes that emit [`GateOperation`]s; they are fed to the
//! same [`CircuitBuilder`](crate::CircuitBuilder) as hand-written circuits.
//!
//! Both templates use one qubit per input value. When the input is wider than
//! the device, [`TruncationPolicy`] decides whether the excess values are
//! dropped or the request is rejected.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::GateOperation;
use crate::qubit::QubitId;

/// What to do with inputs that do not fit on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Keep the first `num_qubits` values and drop the rest.
    #[default]
    Truncate,
    /// Fail with [`IrError::TooManyInputs`].
    Reject,
}

impl TruncationPolicy {
    /// Number of active qubits for `inputs` values on a `num_qubits` device.
    pub fn active_qubits(self, inputs: usize, num_qubits: u32) -> IrResult<u32> {
        let capacity = num_qubits as usize;
        match self {
            TruncationPolicy::Reject if inputs > capacity => Err(IrError::TooManyInputs {
                got: inputs,
                max: num_qubits,
            }),
            _ => Ok(inputs.min(capacity) as u32),
        }
    }
}

/// Operations produced by a template, with the qubits they occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCircuit {
    /// Qubits `0..active_qubits` are used.
    pub active_qubits: u32,
    /// Number of input values dropped by truncation.
    pub dropped_inputs: usize,
    /// Emitted operations.
    pub operations: Vec<GateOperation>,
}

fn entangle_chain(active: u32, ops: &mut Vec<GateOperation>) {
    for i in 1..active {
        ops.push(GateOperation::cnot(QubitId(i - 1), QubitId(i)));
    }
}

fn measure_all(active: u32, ops: &mut Vec<GateOperation>) {
    ops.extend((0..active).map(|i| GateOperation::measure(QubitId(i))));
}

/// Encoding-and-entangle template used for pattern recognition.
///
/// Each feature `f` on qubit `i` is loaded as `H(i)` followed by
/// `Y(i)^(f/π)`. Every layer then entangles neighbours with a CNOT chain and
/// applies `Y^0.5` to each qubit. All active qubits are measured last.
pub fn encode_and_entangle(
    input: &[f64],
    num_qubits: u32,
    layers: usize,
    policy: TruncationPolicy,
) -> IrResult<TemplateCircuit> {
    let active = policy.active_qubits(input.len(), num_qubits)?;
    let mut ops = vec![];

    for (i, feature) in input.iter().take(active as usize).enumerate() {
        let q = QubitId(i as u32);
        ops.push(GateOperation::h(q));
        ops.push(GateOperation::y_pow(q, feature / PI));
    }

    for _ in 0..layers {
        entangle_chain(active, &mut ops);
        for i in 0..active {
            ops.push(GateOperation::y_pow(QubitId(i), 0.5));
        }
    }

    measure_all(active, &mut ops);

    Ok(TemplateCircuit {
        active_qubits: active,
        dropped_inputs: input.len() - active as usize,
        operations: ops,
    })
}

/// Superposition-and-mix template used for optimization.
///
/// Every active qubit starts in `H`. Each iteration applies `X(i)^p_i` with
/// the raw parameter value and then mixes neighbours with a CNOT chain. All
/// active qubits are measured last.
pub fn superpose_and_mix(
    parameters: &[f64],
    num_qubits: u32,
    iterations: usize,
    policy: TruncationPolicy,
) -> IrResult<TemplateCircuit> {
    let active = policy.active_qubits(parameters.len(), num_qubits)?;
    let mut ops: Vec<_> = (0..active).map(|i| GateOperation::h(QubitId(i))).collect();

    for _ in 0..iterations {
        for (i, param) in parameters.iter().take(active as usize).enumerate() {
            ops.push(GateOperation::x_pow(QubitId(i as u32), *param));
        }
        entangle_chain(active, &mut ops);
    }

    measure_all(active, &mut ops);

    Ok(TemplateCircuit {
        active_qubits: active,
        dropped_inputs: parameters.len() - active as usize,
        operations: ops,
    })
}
