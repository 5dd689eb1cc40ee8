//! QPU Middleware Hardware Abstraction Layer
//!
//! This crate holds everything the pipeline needs to know about "the
//! device" without knowing how circuits are simulated:
//!
//! - [`Device`]: the status state machine and the [`DeviceConfig`] it owns
//! - [`Simulator`]: the boundary trait a simulation backend implements
//! - [`ExecutionResult`], [`Histogram`], [`MeasurementTable`]: raw results
//! - [`QpuError`]: the pipeline error taxonomy
//!
//! # Example: Driving a Device by Hand
//!
//! ```rust
//! use qpu_hal::{Device, DeviceConfig, DeviceStatus};
//!
//! let device = Device::new(DeviceConfig::default());
//!
//! let mut lease = device.begin_execution().unwrap();
//! assert_eq!(device.status(), DeviceStatus::Busy);
//!
//! lease.start_simulation().unwrap();
//! assert_eq!(device.status(), DeviceStatus::Simulating);
//!
//! lease.succeed().unwrap();
//! assert_eq!(device.status(), DeviceStatus::Ready);
//! ```

pub mod backend;
pub mod device;
pub mod error;
pub mod result;

pub use backend::Simulator;
pub use device::{Device, DeviceConfig, DeviceSnapshot, DeviceStatus, ExecutionLease};
pub use error::{QpuError, QpuResult};
pub use result::{ExecutionResult, Histogram, KeyedCounts, MeasurementTable};
