//! Runtime configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config:
//!
//! ```yaml
//! device:
//!   num_qubits: 4
//!   error_rate: 0.001
//! pattern:
//!   layers: 2
//!   detection_threshold: 0.6
//! optimization:
//!   iterations: 3
//! truncation: truncate
//! default_shots: 1000
//! noise:
//!   gate_channels:
//!     - kind: depolarizing
//!       p: 0.01
//!   readout_error: 0.02
//! simulator:
//!   max_qubits: 20
//!   seed: 42
//! ```

use std::path::Path;

use qpu_adapter_sim::SimulatorConfig;
use qpu_hal::{DeviceConfig, QpuError, QpuResult};
use qpu_ir::{NoiseModel, TruncationPolicy};
use serde::{Deserialize, Serialize};

/// Pattern-recognition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Entangling layers of the encoding template.
    pub layers: usize,
    /// Confidence above which a pattern counts as detected.
    pub detection_threshold: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            layers: 2,
            detection_threshold: 0.6,
        }
    }
}

/// Optimization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Mixing iterations of the optimization template.
    pub iterations: usize,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self { iterations: 3 }
    }
}

/// Configuration of a [`QpuService`](crate::QpuService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Initial device configuration.
    pub device: DeviceConfig,
    /// Pattern-recognition settings.
    pub pattern: PatternConfig,
    /// Optimization settings.
    pub optimization: OptimizationConfig,
    /// Handling of inputs wider than the device.
    pub truncation: TruncationPolicy,
    /// Shots used when the caller does not choose.
    pub default_shots: u32,
    /// Noise applied by the simulator; `None` runs ideal circuits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<NoiseModel>,
    /// Simulator settings.
    pub simulator: SimulatorConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            pattern: PatternConfig::default(),
            optimization: OptimizationConfig::default(),
            truncation: TruncationPolicy::default(),
            default_shots: 1000,
            noise: None,
            simulator: SimulatorConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> QpuResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| QpuError::Configuration(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> QpuResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            QpuError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> QpuResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| QpuError::Configuration(e.to_string()))
    }

    /// Check value ranges.
    pub fn validate(&self) -> QpuResult<()> {
        self.device.validate()?;
        if !(0.0..=1.0).contains(&self.pattern.detection_threshold) {
            return Err(QpuError::Configuration(format!(
                "pattern.detection_threshold must be within [0, 1], got {}",
                self.pattern.detection_threshold
            )));
        }
        if self.default_shots == 0 {
            return Err(QpuError::Configuration(
                "default_shots must be > 0".into(),
            ));
        }
        self.simulator.validate()?;
        if let Some(noise) = &self.noise {
            noise
                .validate()
                .map_err(|e| QpuError::Configuration(format!("noise: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpu_ir::NoiseChannel;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        let config = RuntimeConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.pattern.layers, 2);
        assert_eq!(config.optimization.iterations, 3);
        assert_eq!(config.default_shots, 1000);
        assert_eq!(config.truncation, TruncationPolicy::Truncate);
    }

    #[test]
    fn test_partial_document() {
        let yaml = r#"
device:
  num_qubits: 6
truncation: reject
noise:
  gate_channels:
    - kind: bit_flip
      p: 0.05
  readout_error: 0.01
simulator:
  seed: 9
"#;
        let config = RuntimeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.device.num_qubits, 6);
        assert_eq!(config.device.error_rate, 0.001);
        assert_eq!(config.truncation, TruncationPolicy::Reject);
        assert_eq!(config.simulator.seed, Some(9));
        assert_eq!(config.simulator.max_qubits, 20);

        let noise = config.noise.unwrap();
        assert_eq!(noise.gate_channels, vec![NoiseChannel::BitFlip { p: 0.05 }]);
        assert_eq!(noise.readout_error, 0.01);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = RuntimeConfig::from_yaml_str("default_shots: 0").unwrap_err();
        assert!(matches!(err, QpuError::Configuration(_)));

        let err = RuntimeConfig::from_yaml_str("pattern:\n  detection_threshold: 1.5").unwrap_err();
        assert!(matches!(err, QpuError::Configuration(_)));

        let err = RuntimeConfig::from_yaml_str("noise:\n  readout_error: 2.0").unwrap_err();
        assert!(err.to_string().contains("noise"));

        let wide = "device:\n  num_qubits: 64\nsimulator:\n  max_qubits: 64";
        let err = RuntimeConfig::from_yaml_str(wide).unwrap_err();
        assert!(err.to_string().contains("simulator.max_qubits"));

        let err = RuntimeConfig::from_yaml_str("device: [1, 2]").unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn test_from_path_roundtrip() {
        let config = RuntimeConfig {
            default_shots: 250,
            noise: Some(NoiseModel::depolarizing(0.01)),
            ..RuntimeConfig::default()
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_yaml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = RuntimeConfig::from_path(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuntimeConfig::from_path(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
