//! Error types for the QPU pipeline.
//!
//! Errors are categorized by who has to act:
//!
//! | Category | Variants | Recovery |
//! |----------|----------|----------|
//! | **Caller** | `InvalidOperation`, `InvalidShotCount` | Fix input, never retry |
//! | **Transient** | `DeviceBusy` | Retry with backoff |
//! | **Data** | `NoSignal` | Treat as inconclusive |
//! | **Device** | `ExecutionFailure`, `Timeout` | Recalibrate before reuse |
//! | **Config** | `UnsupportedHardwareMode`, `Configuration` | Fix configuration |
//! | **Internal** | `InvalidTransition`, `StaleExecution` | Caller bug, or an abandoned run |

use std::time::Duration;

use qpu_ir::IrError;
use thiserror::Error;

use crate::device::DeviceStatus;

/// Errors that can occur in QPU pipeline operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QpuError {
    /// Malformed gate or circuit.
    #[error("Invalid operation: {0}")]
    InvalidOperation(#[from] IrError),

    /// Shot count must be positive.
    #[error("Invalid shot count: {0} (must be positive)")]
    InvalidShotCount(u32),

    /// Only simulation mode exists.
    #[error("Unsupported hardware mode: {0}")]
    UnsupportedHardwareMode(String),

    /// Device is running or calibrating.
    #[error("Device busy (status: {0})")]
    DeviceBusy(DeviceStatus),

    /// Every mitigated histogram is empty.
    #[error("No signal: {0}")]
    NoSignal(String),

    /// Simulator fault.
    #[error("Execution failed during {stage}: {message}")]
    ExecutionFailure {
        /// Pipeline stage that failed.
        stage: &'static str,
        /// Underlying fault.
        message: String,
    },

    /// Caller-imposed deadline elapsed.
    #[error("Execution timed out after {0:?}")]
    Timeout(Duration),

    /// Device state machine misuse.
    #[error("Invalid device transition {from} -> {to}")]
    InvalidTransition {
        /// Status before the attempted transition.
        from: DeviceStatus,
        /// Requested status.
        to: DeviceStatus,
    },

    /// The execution lost its lease (abandoned, forced to Error, or
    /// superseded by a newer admission); its result is discarded.
    #[error("Stale execution lease (generation {lease}, device at {current})")]
    StaleExecution {
        /// Generation the lease was admitted in.
        lease: u64,
        /// Current device generation.
        current: u64,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl QpuError {
    /// Create an execution failure for `stage`.
    pub fn execution(stage: &'static str, message: impl Into<String>) -> Self {
        Self::ExecutionFailure {
            stage,
            message: message.into(),
        }
    }

    /// Returns `true` if this error is transient and the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DeviceBusy(_))
    }

    /// Returns `true` if the device must be recalibrated before reuse.
    pub fn requires_recalibration(&self) -> bool {
        matches!(self, Self::ExecutionFailure { .. } | Self::Timeout(_))
    }
}

/// Result type for QPU pipeline operations.
pub type QpuResult<T> = Result<T, QpuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(QpuError::DeviceBusy(DeviceStatus::Simulating).is_transient());
        assert!(!QpuError::InvalidShotCount(0).is_transient());
        assert!(!QpuError::execution("simulate", "boom").is_transient());
    }

    #[test]
    fn test_recalibration_required() {
        assert!(QpuError::execution("simulate", "boom").requires_recalibration());
        assert!(QpuError::Timeout(Duration::from_secs(1)).requires_recalibration());
        assert!(!QpuError::NoSignal("empty".into()).requires_recalibration());
    }

    #[test]
    fn test_error_display() {
        let err = QpuError::execution("collect", "missing key q2");
        assert_eq!(
            err.to_string(),
            "Execution failed during collect: missing key q2"
        );
        assert_eq!(
            QpuError::DeviceBusy(DeviceStatus::Busy).to_string(),
            "Device busy (status: busy)"
        );
    }

    #[test]
    fn test_ir_error_converts() {
        let err: QpuError = IrError::UnknownGate("SWAP".into()).into();
        assert!(matches!(err, QpuError::InvalidOperation(_)));
        assert_eq!(err.to_string(), "Invalid operation: Unknown gate 'SWAP'");
    }
}
