//! Gate operations.
//!
//! [`GateOperation`] is the closed model used everywhere inside the
//! pipeline: every variant carries exactly the operands its gate needs, so a
//! three-qubit Hadamard or a parameterized CNOT cannot be expressed.
//! [`OperationSpec`] is the open, dictionary-shaped form accepted from
//! callers; converting it performs the checks the closed form makes
//! unnecessary.
//!
//! # Exponents
//!
//! `X`, `Y` and `Z` take an optional exponent `t` and apply the gate raised to
//! the power `t`, i.e. a rotation by `π·t` about the gate axis (up to a global
//! phase). No exponent means `t = 1`, the plain Pauli gate.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// One gate application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "UPPERCASE")]
pub enum GateOperation {
    /// Hadamard gate.
    H {
        /// Target qubit.
        qubit: QubitId,
    },
    /// Pauli-X, optionally raised to `exponent`.
    X {
        /// Target qubit.
        qubit: QubitId,
        /// Gate exponent; `None` means 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exponent: Option<f64>,
    },
    /// Pauli-Y, optionally raised to `exponent`.
    Y {
        /// Target qubit.
        qubit: QubitId,
        /// Gate exponent; `None` means 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exponent: Option<f64>,
    },
    /// Pauli-Z, optionally raised to `exponent`.
    Z {
        /// Target qubit.
        qubit: QubitId,
        /// Gate exponent; `None` means 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exponent: Option<f64>,
    },
    /// Controlled-NOT.
    Cnot {
        /// Control qubit.
        control: QubitId,
        /// Target qubit.
        target: QubitId,
    },
    /// Computational-basis measurement of one qubit.
    Measure {
        /// Measured qubit.
        qubit: QubitId,
        /// Key under which outcomes are reported; `None` means `q{index}`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },
}

impl GateOperation {
    /// Hadamard on `qubit`.
    pub fn h(qubit: impl Into<QubitId>) -> Self {
        GateOperation::H {
            qubit: qubit.into(),
        }
    }

    /// Pauli-X on `qubit`.
    pub fn x(qubit: impl Into<QubitId>) -> Self {
        GateOperation::X {
            qubit: qubit.into(),
            exponent: None,
        }
    }

    /// `X^exponent` on `qubit`.
    pub fn x_pow(qubit: impl Into<QubitId>, exponent: f64) -> Self {
        GateOperation::X {
            qubit: qubit.into(),
            exponent: Some(exponent),
        }
    }

    /// Pauli-Y on `qubit`.
    pub fn y(qubit: impl Into<QubitId>) -> Self {
        GateOperation::Y {
            qubit: qubit.into(),
            exponent: None,
        }
    }

    /// `Y^exponent` on `qubit`.
    pub fn y_pow(qubit: impl Into<QubitId>, exponent: f64) -> Self {
        GateOperation::Y {
            qubit: qubit.into(),
            exponent: Some(exponent),
        }
    }

    /// Pauli-Z on `qubit`.
    pub fn z(qubit: impl Into<QubitId>) -> Self {
        GateOperation::Z {
            qubit: qubit.into(),
            exponent: None,
        }
    }

    /// `Z^exponent` on `qubit`.
    pub fn z_pow(qubit: impl Into<QubitId>, exponent: f64) -> Self {
        GateOperation::Z {
            qubit: qubit.into(),
            exponent: Some(exponent),
        }
    }

    /// CNOT from `control` onto `target`.
    pub fn cnot(control: impl Into<QubitId>, target: impl Into<QubitId>) -> Self {
        GateOperation::Cnot {
            control: control.into(),
            target: target.into(),
        }
    }

    /// Measure `qubit` under its default key.
    pub fn measure(qubit: impl Into<QubitId>) -> Self {
        GateOperation::Measure {
            qubit: qubit.into(),
            key: None,
        }
    }

    /// Measure `qubit` under an explicit key.
    pub fn measure_with_key(qubit: impl Into<QubitId>, key: impl Into<String>) -> Self {
        GateOperation::Measure {
            qubit: qubit.into(),
            key: Some(key.into()),
        }
    }

    /// Canonical upper-case gate name.
    pub fn name(&self) -> &'static str {
        match self {
            GateOperation::H { .. } => "H",
            GateOperation::X { .. } => "X",
            GateOperation::Y { .. } => "Y",
            GateOperation::Z { .. } => "Z",
            GateOperation::Cnot { .. } => "CNOT",
            GateOperation::Measure { .. } => "MEASURE",
        }
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            GateOperation::Cnot { .. } => 2,
            _ => 1,
        }
    }

    /// Qubits in operand order.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            GateOperation::H { qubit }
            | GateOperation::X { qubit, .. }
            | GateOperation::Y { qubit, .. }
            | GateOperation::Z { qubit, .. }
            | GateOperation::Measure { qubit, .. } => vec![*qubit],
            GateOperation::Cnot { control, target } => vec![*control, *target],
        }
    }

    /// Exponent of a Pauli power gate, if one was given.
    pub fn exponent(&self) -> Option<f64> {
        match self {
            GateOperation::X { exponent, .. }
            | GateOperation::Y { exponent, .. }
            | GateOperation::Z { exponent, .. } => *exponent,
            _ => None,
        }
    }

    /// Resolved measurement key, or `None` for unitary gates.
    pub fn measurement_key(&self) -> Option<String> {
        match self {
            GateOperation::Measure { qubit, key } => {
                Some(key.clone().unwrap_or_else(|| qubit.default_key()))
            }
            _ => None,
        }
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self, GateOperation::Measure { .. })
    }

    /// Check the operation against a circuit of `num_qubits` qubits.
    pub fn validate(&self, num_qubits: u32) -> IrResult<()> {
        let qubits = self.qubits();
        for q in &qubits {
            if q.0 >= num_qubits {
                return Err(IrError::QubitOutOfRange {
                    qubit: *q,
                    num_qubits,
                    gate: self.name(),
                });
            }
        }
        if let [a, b] = qubits.as_slice() {
            if a == b {
                return Err(IrError::DuplicateQubit {
                    qubit: *a,
                    gate: self.name(),
                });
            }
        }
        if let Some(value) = self.exponent() {
            if !value.is_finite() {
                return Err(IrError::InvalidExponent {
                    gate: self.name(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Open operation description as supplied by callers.
///
/// ```json
/// {"gate": "y", "qubits": [2], "params": 0.5}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Gate name, case-insensitive (`CX` is accepted for `CNOT`).
    pub gate: String,
    /// Qubit indices in operand order.
    pub qubits: Vec<u32>,
    /// Exponent for X, Y, Z. Ignored by other gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<f64>,
    /// Measurement key for MEASURE. Ignored by other gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl OperationSpec {
    /// Create a spec without exponent or key.
    pub fn new(gate: impl Into<String>, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            gate: gate.into(),
            qubits: qubits.into_iter().collect(),
            params: None,
            key: None,
        }
    }

    /// Set the exponent.
    #[must_use]
    pub fn with_params(mut self, params: f64) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the measurement key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    fn single_qubit(&self, gate: &str) -> IrResult<QubitId> {
        match self.qubits.as_slice() {
            [q] => Ok(QubitId(*q)),
            other => Err(IrError::QubitCountMismatch {
                gate: gate.to_string(),
                expected: 1,
                got: other.len(),
            }),
        }
    }
}

impl TryFrom<OperationSpec> for GateOperation {
    type Error = IrError;

    fn try_from(spec: OperationSpec) -> IrResult<Self> {
        let gate = spec.gate.to_ascii_uppercase();
        let op = match gate.as_str() {
            "H" => GateOperation::H {
                qubit: spec.single_qubit(&gate)?,
            },
            "X" => GateOperation::X {
                qubit: spec.single_qubit(&gate)?,
                exponent: spec.params,
            },
            "Y" => GateOperation::Y {
                qubit: spec.single_qubit(&gate)?,
                exponent: spec.params,
            },
            "Z" => GateOperation::Z {
                qubit: spec.single_qubit(&gate)?,
                exponent: spec.params,
            },
            "CNOT" | "CX" => match spec.qubits.as_slice() {
                [control, target] if control == target => {
                    return Err(IrError::DuplicateQubit {
                        qubit: QubitId(*control),
                        gate: "CNOT",
                    });
                }
                [control, target] => GateOperation::Cnot {
                    control: QubitId(*control),
                    target: QubitId(*target),
                },
                other => {
                    return Err(IrError::QubitCountMismatch {
                        gate: "CNOT".to_string(),
                        expected: 2,
                        got: other.len(),
                    });
                }
            },
            "MEASURE" => GateOperation::Measure {
                qubit: spec.single_qubit(&gate)?,
                key: spec.key,
            },
            _ => return Err(IrError::UnknownGate(spec.gate)),
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_properties() {
        assert_eq!(GateOperation::h(0u32).num_qubits(), 1);
        assert_eq!(GateOperation::cnot(0u32, 1u32).num_qubits(), 2);
        assert_eq!(GateOperation::cnot(0u32, 1u32).name(), "CNOT");
        assert_eq!(GateOperation::y_pow(2u32, 0.5).exponent(), Some(0.5));
        assert_eq!(GateOperation::y(2u32).exponent(), None);
    }

    #[test]
    fn test_measurement_key_defaults_to_qubit() {
        assert_eq!(
            GateOperation::measure(3u32).measurement_key().as_deref(),
            Some("q3")
        );
        assert_eq!(
            GateOperation::measure_with_key(3u32, "flag")
                .measurement_key()
                .as_deref(),
            Some("flag")
        );
        assert_eq!(GateOperation::h(0u32).measurement_key(), None);
    }

    #[test]
    fn test_validate_range_and_duplicates() {
        assert!(GateOperation::h(3u32).validate(4).is_ok());
        assert!(matches!(
            GateOperation::h(4u32).validate(4),
            Err(IrError::QubitOutOfRange { .. })
        ));
        assert!(matches!(
            GateOperation::cnot(1u32, 1u32).validate(4),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            GateOperation::x_pow(0u32, f64::NAN).validate(1),
            Err(IrError::InvalidExponent { gate: "X", .. })
        ));
    }

    #[test]
    fn test_spec_conversion() {
        let op = GateOperation::try_from(OperationSpec::new("y", [2]).with_params(0.25)).unwrap();
        assert_eq!(op, GateOperation::y_pow(2u32, 0.25));

        let op = GateOperation::try_from(OperationSpec::new("CX", [0, 1])).unwrap();
        assert_eq!(op, GateOperation::cnot(0u32, 1u32));

        let op = GateOperation::try_from(OperationSpec::new("measure", [1]).with_key("m")).unwrap();
        assert_eq!(op.measurement_key().as_deref(), Some("m"));
    }

    #[test]
    fn test_spec_conversion_errors() {
        assert!(matches!(
            GateOperation::try_from(OperationSpec::new("toffoli", [0, 1, 2])),
            Err(IrError::UnknownGate(name)) if name == "toffoli"
        ));
        assert!(matches!(
            GateOperation::try_from(OperationSpec::new("CNOT", [0])),
            Err(IrError::QubitCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            GateOperation::try_from(OperationSpec::new("CNOT", [2, 2])),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            GateOperation::try_from(OperationSpec::new("H", [0, 1])),
            Err(IrError::QubitCountMismatch { expected: 1, got: 2, .. })
        ));
    }

    #[test]
    fn test_serde_tagged_form() {
        let json = serde_json::to_string(&GateOperation::x_pow(1u32, 0.3)).unwrap();
        assert_eq!(json, r#"{"gate":"X","qubit":1,"exponent":0.3}"#);

        let op: GateOperation =
            serde_json::from_str(r#"{"gate":"CNOT","control":0,"target":3}"#).unwrap();
        assert_eq!(op, GateOperation::cnot(0u32, 3u32));

        let spec: OperationSpec = serde_json::from_str(r#"{"gate":"Z","qubits":[0]}"#).unwrap();
        assert_eq!(spec.params, None);
    }
}
