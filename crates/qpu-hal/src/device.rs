//! Simulated device: configuration and status state machine.
//!
//! ```text
//!            ┌────────────── calibrate() ──────────────┐
//!            ▼                                         │
//!   ┌──→ Ready ──→ Busy ──→ Simulating ──→ Ready   Calibrating ──→ Ready
//!   │      │         │           │                     ▲
//!   │      └─────────┴───────────┴──→ Error ───────────┘
//!   │                                   │
//!   └──────────── retry (execute) ──────┘
//! ```
//!
//! **Invariants:**
//! - Only one execution or calibration is in flight per device. Admission
//!   is a check-and-set under the device mutex; a request that finds the
//!   device Busy, Simulating or Calibrating fails with
//!   [`QpuError::DeviceBusy`] instead of waiting.
//! - Any state may move to Error. Error is not terminal: a calibration or a
//!   retried execution leaves it.
//! - Every admission and every forced move to Error starts a new
//!   generation. An [`ExecutionLease`] only acts while its generation is
//!   current, so a run that was abandoned or forced to Error can never
//!   finish on top of a newer one.
//! - Only calibration mutates [`DeviceConfig`].
//! - Reading the status has no side effects.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{QpuError, QpuResult};

/// Nominal error rate restored by calibration.
pub const NOMINAL_ERROR_RATE: f64 = 0.001;
/// Nominal gate fidelity restored by calibration.
pub const NOMINAL_GATE_FIDELITY: f64 = 0.99;
/// Nominal measurement fidelity restored by calibration.
pub const NOMINAL_MEASUREMENT_FIDELITY: f64 = 0.98;

/// Status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// Idle and accepting work.
    Ready,
    /// Execution admitted, simulation not yet started.
    Busy,
    /// Simulator is running a circuit.
    Simulating,
    /// Calibration in progress.
    Calibrating,
    /// Last execution or calibration failed.
    Error,
}

impl DeviceStatus {
    /// Check if new work may be admitted (Ready, or Error as a retry).
    pub fn is_admissible(&self) -> bool {
        matches!(self, DeviceStatus::Ready | DeviceStatus::Error)
    }

    /// Check if the state machine allows moving to `next`.
    pub fn can_transition_to(self, next: DeviceStatus) -> bool {
        use DeviceStatus::*;
        match (self, next) {
            (_, Error) => true,
            (Ready | Error, Busy | Calibrating) => true,
            (Busy, Simulating) => true,
            (Simulating | Calibrating, Ready) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceStatus::Ready => "ready",
            DeviceStatus::Busy => "busy",
            DeviceStatus::Simulating => "simulating",
            DeviceStatus::Calibrating => "calibrating",
            DeviceStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Configuration parameters of a simulated device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Number of qubits on the device.
    pub num_qubits: u32,
    /// Whether the device only simulates. `false` is rejected at execution.
    pub simulation_only: bool,
    /// Maximum circuit depth accepted.
    pub max_circuit_depth: usize,
    /// Error rate used as the mitigation threshold.
    pub error_rate: f64,
    /// Coherence time in microseconds.
    pub coherence_time_us: f64,
    /// Average gate fidelity.
    pub gate_fidelity: f64,
    /// Average measurement fidelity.
    pub measurement_fidelity: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            num_qubits: 4,
            simulation_only: true,
            max_circuit_depth: 100,
            error_rate: NOMINAL_ERROR_RATE,
            coherence_time_us: 100.0,
            gate_fidelity: NOMINAL_GATE_FIDELITY,
            measurement_fidelity: NOMINAL_MEASUREMENT_FIDELITY,
        }
    }
}

impl DeviceConfig {
    /// Default configuration with `num_qubits` qubits.
    pub fn with_qubits(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            ..Self::default()
        }
    }

    /// Set the error rate.
    #[must_use]
    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> QpuResult<()> {
        if self.num_qubits == 0 {
            return Err(QpuError::Configuration("num_qubits must be > 0".into()));
        }
        if self.max_circuit_depth == 0 {
            return Err(QpuError::Configuration(
                "max_circuit_depth must be > 0".into(),
            ));
        }
        for (name, value) in [
            ("error_rate", self.error_rate),
            ("gate_fidelity", self.gate_fidelity),
            ("measurement_fidelity", self.measurement_fidelity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QpuError::Configuration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if !(self.coherence_time_us > 0.0) {
            return Err(QpuError::Configuration(format!(
                "coherence_time_us must be > 0, got {}",
                self.coherence_time_us
            )));
        }
        Ok(())
    }

    fn reset_to_nominal(&mut self) {
        self.error_rate = NOMINAL_ERROR_RATE;
        self.gate_fidelity = NOMINAL_GATE_FIDELITY;
        self.measurement_fidelity = NOMINAL_MEASUREMENT_FIDELITY;
    }
}

struct DeviceState {
    status: DeviceStatus,
    config: DeviceConfig,
    last_calibrated: Option<DateTime<Utc>>,
    executions_completed: u64,
    generation: u64,
}

/// Point-in-time view of a device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSnapshot {
    /// Device name.
    pub name: String,
    /// Current status.
    pub status: DeviceStatus,
    /// Current configuration.
    pub config: DeviceConfig,
    /// Time of the last successful calibration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_calibrated: Option<DateTime<Utc>>,
    /// Number of executions that completed successfully.
    pub executions_completed: u64,
}

/// A simulated QPU.
///
/// The device is the single authoritative owner of its status and
/// configuration. Share it with `Arc<Device>`; independent devices share
/// nothing.
pub struct Device {
    name: String,
    state: Mutex<DeviceState>,
}

impl Device {
    /// Create a device in status Ready.
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_name("qpu-sim", config)
    }

    /// Create a named device in status Ready.
    pub fn with_name(name: impl Into<String>, config: DeviceConfig) -> Self {
        let name = name.into();
        info!(
            device = %name,
            num_qubits = config.num_qubits,
            "Initialized device"
        );
        Self {
            name,
            state: Mutex::new(DeviceState {
                status: DeviceStatus::Ready,
                config,
                last_calibrated: None,
                executions_completed: 0,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current status.
    pub fn status(&self) -> DeviceStatus {
        self.lock().status
    }

    /// Get a copy of the current configuration.
    pub fn config(&self) -> DeviceConfig {
        self.lock().config.clone()
    }

    /// Get a point-in-time view of the device.
    pub fn snapshot(&self) -> DeviceSnapshot {
        let state = self.lock();
        DeviceSnapshot {
            name: self.name.clone(),
            status: state.status,
            config: state.config.clone(),
            last_calibrated: state.last_calibrated,
            executions_completed: state.executions_completed,
        }
    }

    fn transition(&self, state: &mut DeviceState, to: DeviceStatus) -> QpuResult<()> {
        let from = state.status;
        if !from.can_transition_to(to) {
            return Err(QpuError::InvalidTransition { from, to });
        }
        state.status = to;
        debug!(device = %self.name, %from, %to, "Device transition");
        Ok(())
    }

    fn admit(&self, state: &mut DeviceState, to: DeviceStatus) -> QpuResult<u64> {
        if !state.status.is_admissible() {
            return Err(QpuError::DeviceBusy(state.status));
        }
        self.transition(state, to)?;
        state.generation += 1;
        Ok(state.generation)
    }

    fn force_error(&self, state: &mut DeviceState) {
        // Every state may move to Error.
        let _ = self.transition(state, DeviceStatus::Error);
        state.generation += 1;
    }

    /// Move the device to Error.
    ///
    /// Any execution still in flight loses its lease: its later
    /// [`ExecutionLease::succeed`] fails with [`QpuError::StaleExecution`]
    /// and leaves the status alone.
    pub fn mark_error(&self) {
        let mut state = self.lock();
        self.force_error(&mut state);
    }

    /// Admit one execution: Ready (or Error) → Busy.
    ///
    /// The returned lease owns the in-flight slot. Dropping it without
    /// calling [`ExecutionLease::succeed`] or [`ExecutionLease::fail`] moves
    /// the device to Error, so an abandoned execution (for example one whose
    /// future was dropped by a timeout) never leaves the device looking idle.
    pub fn begin_execution(&self) -> QpuResult<ExecutionLease<'_>> {
        let mut state = self.lock();
        let generation = self.admit(&mut state, DeviceStatus::Busy)?;
        Ok(ExecutionLease {
            device: self,
            generation,
            finished: false,
        })
    }

    /// Reset error rate and fidelities to nominal values.
    ///
    /// Ready (or Error) → Calibrating → Ready. Outside simulation mode the
    /// device ends in Error and [`QpuError::UnsupportedHardwareMode`] is
    /// returned.
    pub fn calibrate(&self) -> QpuResult<()> {
        {
            let mut state = self.lock();
            self.admit(&mut state, DeviceStatus::Calibrating)?;
        }
        info!(device = %self.name, "Starting calibration");

        let mut state = self.lock();
        if !state.config.simulation_only {
            self.force_error(&mut state);
            return Err(QpuError::UnsupportedHardwareMode(
                "hardware calibration is not available; only simulation is supported".into(),
            ));
        }
        state.config.reset_to_nominal();
        state.last_calibrated = Some(Utc::now());
        self.transition(&mut state, DeviceStatus::Ready)?;
        info!(device = %self.name, "Calibration completed");
        Ok(())
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("status", &self.status())
            .finish()
    }
}

/// Exclusive right to run one execution on a [`Device`].
#[derive(Debug)]
#[must_use = "dropping the lease marks the device as failed"]
pub struct ExecutionLease<'a> {
    device: &'a Device,
    generation: u64,
    finished: bool,
}

impl ExecutionLease<'_> {
    fn current<'s>(&self, state: &'s mut DeviceState) -> QpuResult<&'s mut DeviceState> {
        if state.generation != self.generation {
            warn!(
                device = %self.device.name,
                lease = self.generation,
                current = state.generation,
                "Ignoring stale execution lease"
            );
            return Err(QpuError::StaleExecution {
                lease: self.generation,
                current: state.generation,
            });
        }
        Ok(state)
    }

    /// Busy → Simulating.
    pub fn start_simulation(&mut self) -> QpuResult<()> {
        let mut guard = self.device.lock();
        let state = self.current(&mut guard)?;
        self.device.transition(state, DeviceStatus::Simulating)
    }

    /// Simulating → Ready.
    pub fn succeed(mut self) -> QpuResult<()> {
        self.finished = true;
        let mut guard = self.device.lock();
        let state = self.current(&mut guard)?;
        match self.device.transition(state, DeviceStatus::Ready) {
            Ok(()) => {
                state.executions_completed += 1;
                Ok(())
            }
            Err(err) => {
                // Leave the device in a state that forces attention.
                self.device.force_error(state);
                Err(err)
            }
        }
    }

    /// Any state → Error. A stale lease leaves the device alone.
    pub fn fail(mut self) {
        self.finished = true;
        let mut guard = self.device.lock();
        if let Ok(state) = self.current(&mut guard) {
            self.device.force_error(state);
        }
    }
}

impl Drop for ExecutionLease<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut guard = self.device.lock();
        if let Ok(state) = self.current(&mut guard) {
            warn!(device = %self.device.name, "Execution abandoned; marking device as error");
            self.device.force_error(state);
        }
    }
}
