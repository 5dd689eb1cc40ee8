//! Noise models for simulated execution.
//!
//! A [`NoiseModel`] lists channels applied after every gate to each qubit the
//! gate touches, plus a readout error applied to each measured bit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// A single-qubit noise channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseChannel {
    /// With probability `p`, apply a uniformly random Pauli (X, Y or Z).
    Depolarizing {
        /// Error probability (0.0 to 1.0).
        p: f64,
    },
    /// Flips |0⟩ ↔ |1⟩ with probability `p`.
    BitFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },
    /// Applies Z with probability `p`.
    PhaseFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },
    /// Energy relaxation (T1 decay).
    AmplitudeDamping {
        /// Damping parameter (0.0 to 1.0).
        gamma: f64,
    },
}

impl NoiseChannel {
    /// Get a human-readable name for this channel.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseChannel::Depolarizing { .. } => "depolarizing",
            NoiseChannel::BitFlip { .. } => "bit_flip",
            NoiseChannel::PhaseFlip { .. } => "phase_flip",
            NoiseChannel::AmplitudeDamping { .. } => "amplitude_damping",
        }
    }

    /// Get the primary error parameter of this channel.
    pub fn error_param(&self) -> f64 {
        match self {
            NoiseChannel::Depolarizing { p }
            | NoiseChannel::BitFlip { p }
            | NoiseChannel::PhaseFlip { p } => *p,
            NoiseChannel::AmplitudeDamping { gamma } => *gamma,
        }
    }
}

impl fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseChannel::AmplitudeDamping { gamma } => {
                write!(f, "amplitude_damping(γ={gamma:.4})")
            }
            other => write!(f, "{}(p={:.4})", other.name(), other.error_param()),
        }
    }
}

fn check_probability(channel: &'static str, value: f64) -> IrResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(IrError::InvalidNoiseParameter { channel, value })
    }
}

/// Noise applied by a simulator during one execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Channels applied, in order, after each gate on each of its qubits.
    #[serde(default)]
    pub gate_channels: Vec<NoiseChannel>,
    /// Probability that a measured bit is reported flipped.
    #[serde(default)]
    pub readout_error: f64,
}

impl NoiseModel {
    /// A model with no noise at all.
    pub fn ideal() -> Self {
        Self::default()
    }

    /// Depolarizing noise of strength `p` after every gate.
    pub fn depolarizing(p: f64) -> Self {
        Self::ideal().with_channel(NoiseChannel::Depolarizing { p })
    }

    /// Derive a model from device fidelities.
    ///
    /// Gate infidelity becomes depolarizing noise; measurement infidelity
    /// becomes readout error.
    pub fn from_fidelities(gate_fidelity: f64, measurement_fidelity: f64) -> Self {
        Self::depolarizing(1.0 - gate_fidelity).with_readout_error(1.0 - measurement_fidelity)
    }

    /// Add a gate channel.
    #[must_use]
    pub fn with_channel(mut self, channel: NoiseChannel) -> Self {
        self.gate_channels.push(channel);
        self
    }

    /// Set the readout error.
    #[must_use]
    pub fn with_readout_error(mut self, p: f64) -> Self {
        self.readout_error = p;
        self
    }

    /// Check if the model changes nothing.
    pub fn is_ideal(&self) -> bool {
        self.readout_error == 0.0 && self.gate_channels.iter().all(|c| c.error_param() == 0.0)
    }

    /// Check that every probability lies in `[0, 1]`.
    pub fn validate(&self) -> IrResult<()> {
        for channel in &self.gate_channels {
            check_probability(channel.name(), channel.error_param())?;
        }
        check_probability("readout_error", self.readout_error)
    }
}
