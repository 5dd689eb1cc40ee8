//! QPU Middleware Runtime
//!
//! The pipeline that turns caller data into answers:
//!
//! ```text
//! input → template → CircuitSpec → execute → mitigate → interpret → report
//! ```
//!
//! - [`executor::execute`]: admission, device status walk, histogramming
//! - [`Mitigator`] / [`ThresholdMitigation`]: noise filtering
//! - [`Interpreter`]: pattern confidence and optimal key
//! - [`QpuService`]: the facade callers use
//! - [`RuntimeConfig`]: YAML-loadable settings
//!
//! # Example
//!
//! ```no_run
//! use qpu_runtime::{QpuService, RuntimeConfig};
//!
//! # async fn run() -> qpu_hal::QpuResult<()> {
//! let service = QpuService::new(RuntimeConfig::default())?;
//!
//! let report = service
//!     .run_pattern_recognition(&[0.5, 0.3, 0.8, 0.1], 1000)
//!     .await?;
//! println!("detected={} confidence={:.3}", report.pattern_detected, report.confidence);
//!
//! let report = service.run_optimization(&[0.1, 0.4, 0.6, 0.8], 1000).await?;
//! println!("optimal={}", report.optimal_solution);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod executor;
pub mod interpret;
pub mod mitigation;
pub mod service;

pub use config::{OptimizationConfig, PatternConfig, RuntimeConfig};
pub use interpret::{
    DetailedResults, Interpreter, OptimizationInterpreter, OptimizationReport, PatternAnalysis,
    PatternInterpreter, PatternReport,
};
pub use mitigation::{MitigatedResult, Mitigator, ThresholdMitigation};
pub use service::QpuService;
