//! End-to-end runs of the pattern-recognition and optimization pipelines.

mod common;

use qpu_hal::{DeviceStatus, QpuError};
use qpu_ir::{IrError, NoiseModel, TruncationPolicy};
use qpu_runtime::{QpuService, RuntimeConfig};

fn seeded_service(seed: u64) -> QpuService {
    let mut config = RuntimeConfig::default();
    config.simulator.seed = Some(seed);
    QpuService::new(config).unwrap()
}

// ---------------------------------------------------------------------------
// Pattern recognition
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pattern_recognition_reference_input() {
    let service = seeded_service(42);
    let report = service
        .run_pattern_recognition(&[0.5, 0.3, 0.8, 0.1], 1000)
        .await
        .unwrap();

    assert!(report.confidence > 0.0 && report.confidence <= 1.0);
    assert_eq!(report.pattern_detected, report.confidence > 0.6);

    let raw = &report.detailed.raw;
    assert_eq!(raw.counts.len(), 4);
    for histogram in raw.counts.values() {
        assert_eq!(histogram.total(), 1000);
    }
    assert_eq!(report.detailed.mitigated.error_rate, 0.001);
    assert_eq!(service.check_status(), DeviceStatus::Ready);
}

#[tokio::test]
async fn pattern_recognition_is_reproducible_with_seed() {
    let a = seeded_service(7)
        .run_pattern_recognition(&[0.2, 0.9], 300)
        .await
        .unwrap();
    let b = seeded_service(7)
        .run_pattern_recognition(&[0.2, 0.9], 300)
        .await
        .unwrap();

    assert_eq!(a.detailed.raw.counts, b.detailed.raw.counts);
    assert_eq!(a.confidence, b.confidence);
}

#[tokio::test]
async fn wide_input_is_truncated_by_default() {
    let service = seeded_service(1);
    let report = service
        .run_pattern_recognition(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 100)
        .await
        .unwrap();

    let keys: Vec<_> = report.detailed.raw.counts.keys().cloned().collect();
    assert_eq!(keys, ["q0", "q1", "q2", "q3"]);
}

#[tokio::test]
async fn wide_input_rejected_when_configured() {
    let config = RuntimeConfig {
        truncation: TruncationPolicy::Reject,
        ..RuntimeConfig::default()
    };
    let service = QpuService::new(config).unwrap();

    let err = service
        .run_pattern_recognition(&[0.1; 6], 100)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QpuError::InvalidOperation(IrError::TooManyInputs { got: 6, max: 4 })
    ));
    assert_eq!(service.check_status(), DeviceStatus::Ready);
}

#[tokio::test]
async fn empty_input_has_no_signal() {
    let service = seeded_service(1);
    let err = service.run_pattern_recognition(&[], 100).await.unwrap_err();
    assert!(matches!(err, QpuError::NoSignal(_)));
    assert_eq!(service.check_status(), DeviceStatus::Ready);
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn optimization_returns_surviving_key() {
    let service = seeded_service(3);
    let report = service
        .run_optimization(&[0.1, 0.4, 0.6, 0.8], 1000)
        .await
        .unwrap();

    let mitigated = &report.detailed.mitigated;
    let winner = mitigated.histogram(&report.optimal_solution).unwrap();
    assert!(!winner.is_empty());
    for histogram in mitigated.counts.values() {
        assert!(histogram.total() <= winner.total());
    }
}

#[tokio::test]
async fn optimization_with_noise() {
    let mut config = RuntimeConfig {
        noise: Some(NoiseModel::from_fidelities(0.99, 0.98)),
        ..RuntimeConfig::default()
    };
    config.simulator.seed = Some(5);
    let service = QpuService::new(config).unwrap();

    let report = service.run_optimization(&[0.3, 0.7], 500).await.unwrap();
    assert!(["q0", "q1"].contains(&report.optimal_solution.as_str()));
    for histogram in report.detailed.raw.counts.values() {
        assert_eq!(histogram.total(), 500);
    }
}

// ---------------------------------------------------------------------------
// Shots and modes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn zero_shots_rejected_before_admission() {
    let service = seeded_service(1);
    let err = service.run_optimization(&[0.5], 0).await.unwrap_err();
    assert!(matches!(err, QpuError::InvalidShotCount(0)));
    assert_eq!(service.check_status(), DeviceStatus::Ready);
}

#[tokio::test]
async fn hardware_mode_is_unsupported() {
    let mut config = RuntimeConfig::default();
    config.device.simulation_only = false;
    let service = QpuService::new(config).unwrap();

    let err = service
        .run_pattern_recognition(&[0.5, 0.3], 100)
        .await
        .unwrap_err();
    assert!(matches!(err, QpuError::UnsupportedHardwareMode(_)));
    assert_eq!(service.check_status(), DeviceStatus::Error);

    assert!(!service.calibrate());
    assert_eq!(service.check_status(), DeviceStatus::Error);
}

#[tokio::test]
async fn reports_serialize_to_json() {
    let service = seeded_service(9);
    let report = service.run_optimization(&[0.2, 0.4], 50).await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["optimal_solution"], report.optimal_solution.as_str());
    assert_eq!(json["detailed"]["raw"]["shots"], 50);
}
