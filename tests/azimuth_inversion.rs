//! Orientation recovery on synthetic three-channel microseism records.
//!
//! The reference carries a radial signal `R`; the sensor under test sees `R`
//! and an independent transverse signal `Q` rotated by a known angle, plus
//! noise. The inversion must recover that angle.

use std::cell::RefCell;
use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use seismic_core::{
    estimate_azimuth, AzimuthConfig, AzimuthInversionEngine, CancellationToken,
    InversionMonitor, InversionState, SeismicError,
};

// =============================================================================
// SIGNAL GENERATORS
// =============================================================================

/// Sum of sinusoids with random phases, sampled at 1 Hz.
fn microseism(n: usize, components: &[(f64, f64)], rng: &mut StdRng) -> Vec<f64> {
    let phases: Vec<f64> = components.iter().map(|_| rng.gen_range(0.0..2.0 * PI)).collect();
    (0..n)
        .map(|i| {
            components
                .iter()
                .zip(phases.iter())
                .map(|(&(freq, amp), &phase)| amp * (2.0 * PI * freq * i as f64 + phase).sin())
                .sum()
        })
        .collect()
}

/// (north, east, reference) for a sensor misoriented by `theta_degrees`.
fn rotated_station(n: usize, theta_degrees: f64, seed: u64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let radial = microseism(
        n,
        &[(0.12, 0.8), (0.16, 2.0), (0.21, 1.0), (0.27, 0.5)],
        &mut rng,
    );
    let transverse = microseism(
        n,
        &[(0.13, 0.7), (0.18, 1.2), (0.24, 0.9)],
        &mut rng,
    );
    let noise = Normal::new(0.0, 0.05).unwrap();
    let (sin, cos) = theta_degrees.to_radians().sin_cos();

    let mut north = Vec::with_capacity(n);
    let mut east = Vec::with_capacity(n);
    for (&r, &q) in radial.iter().zip(transverse.iter()) {
        north.push(r * cos + q * sin + rng.sample(noise));
        east.push(q * cos - r * sin + rng.sample(noise));
    }
    let reference = radial.iter().map(|r| r + rng.sample(noise)).collect();
    (north, east, reference)
}

fn angle_error(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Records progress and cancels once a threshold is reached.
struct Recorder {
    progress: RefCell<Vec<u8>>,
    cancel_at: Option<u8>,
}

impl Recorder {
    fn new(cancel_at: Option<u8>) -> Self {
        Self {
            progress: RefCell::new(Vec::new()),
            cancel_at,
        }
    }
}

impl InversionMonitor for Recorder {
    fn is_cancelled(&self) -> bool {
        match (self.cancel_at, self.progress.borrow().last()) {
            (Some(limit), Some(&last)) => last >= limit,
            _ => false,
        }
    }

    fn report_progress(&self, percent: u8) {
        self.progress.borrow_mut().push(percent);
    }
}

// =============================================================================
// RECOVERY
// =============================================================================

#[test]
fn test_recovers_known_rotation() {
    let (north, east, reference) = rotated_station(10_000, 37.0, 42);
    let result = estimate_azimuth(&north, &east, &reference, &AzimuthConfig::default()).unwrap();

    assert!(
        angle_error(result.best_theta, 37.0) < 2.0,
        "best_theta = {}",
        result.best_theta
    );
    assert!(result.best_correlation > 1.9, "{}", result.best_correlation);
    assert!(result.standard_deviation < 2.0);
    assert!(result.full_series_correlation > 0.9);

    // floor(10000 / 500) - ceil(2000 / 500)
    assert_eq!(result.thetas.len(), 16);
    assert_eq!(result.correlations.len(), 16);
    // 15% of 16 rounds up to 3
    assert_eq!(result.best_windows.len(), 3);
    assert!((result.peak_frequency - 0.16).abs() < 2.0 / 512.0);
    assert!(result.corners.low_hz < result.corners.high_hz);
    assert!(result
        .thetas
        .iter()
        .all(|t| (0.0..360.0).contains(t)));
    assert!(result
        .correlations
        .iter()
        .all(|c| (0.0..=2.0).contains(c)));
}

#[test]
fn test_recovers_rotation_near_seam() {
    let (north, east, reference) = rotated_station(8_000, 358.5, 7);
    let mut engine = AzimuthInversionEngine::new(AzimuthConfig::one_hz()).unwrap();
    let result = engine.process(&north, &east, &reference).unwrap();

    assert!(
        angle_error(result.best_theta, 358.5) < 2.0,
        "best_theta = {}",
        result.best_theta
    );
    assert!((0.0..360.0).contains(&result.best_theta));
    assert_eq!(engine.state(), InversionState::Done);
}

#[test]
fn test_fast_preset() {
    let (north, east, reference) = rotated_station(6_000, 120.0, 3);
    let result = estimate_azimuth(&north, &east, &reference, &AzimuthConfig::fast()).unwrap();
    assert!(angle_error(result.best_theta, 120.0) < 3.0, "{}", result.best_theta);
}

// =============================================================================
// MONITORING
// =============================================================================

#[test]
fn test_progress_is_monotonic_and_capped() {
    let (north, east, reference) = rotated_station(6_000, 10.0, 5);
    let mut engine = AzimuthInversionEngine::new(AzimuthConfig::default()).unwrap();
    let recorder = Recorder::new(None);
    engine
        .process_with_monitor(&north, &east, &reference, &recorder)
        .unwrap();

    let progress = recorder.progress.into_inner();
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    let (last, before) = progress.split_last().unwrap();
    assert_eq!(*last, 100);
    assert!(before.iter().all(|&p| p <= 99));
}

#[test]
fn test_cancel_before_start() {
    let (north, east, reference) = rotated_station(6_000, 10.0, 5);
    let mut engine = AzimuthInversionEngine::new(AzimuthConfig::default()).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let err = engine
        .process_with_monitor(&north, &east, &reference, &token)
        .unwrap_err();
    assert_eq!(
        err,
        SeismicError::Cancelled {
            completed_windows: 0
        }
    );
    assert_eq!(engine.state(), InversionState::Cancelled);
}

#[test]
fn test_cancel_mid_run() {
    let (north, east, reference) = rotated_station(10_000, 10.0, 5);
    let mut engine = AzimuthInversionEngine::new(AzimuthConfig::default()).unwrap();
    let recorder = Recorder::new(Some(50));

    let err = engine
        .process_with_monitor(&north, &east, &reference, &recorder)
        .unwrap_err();
    match err {
        SeismicError::Cancelled { completed_windows } => {
            assert!(completed_windows > 0 && completed_windows < 16);
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert!(recorder.progress.borrow().iter().all(|&p| p < 100));
    assert_eq!(engine.state(), InversionState::Cancelled);
}

// =============================================================================
// INPUT ERRORS
// =============================================================================

#[test]
fn test_failed_window_aborts_run() {
    let (north, east, reference) = rotated_station(6_000, 60.0, 13);
    let config = AzimuthConfig::default().with_solver(0.01, 1e-9, 1);
    let mut engine = AzimuthInversionEngine::new(config).unwrap();
    let recorder = Recorder::new(None);

    let err = engine
        .process_with_monitor(&north, &east, &reference, &recorder)
        .unwrap_err();
    assert!(
        matches!(err, SeismicError::Convergence { window: 0, .. }),
        "{err:?}"
    );
    assert_eq!(engine.state(), InversionState::Failed);
    // No window finished, so nothing was reported
    assert!(recorder.progress.borrow().is_empty());
}

#[test]
fn test_rejects_mismatched_lengths() {
    let (north, east, reference) = rotated_station(5_000, 10.0, 1);
    let err = estimate_azimuth(&north[..4_999], &east, &reference, &AzimuthConfig::default())
        .unwrap_err();
    assert_eq!(
        err,
        SeismicError::LengthMismatch {
            north: 4_999,
            east: 5_000,
            reference: 5_000
        }
    );
}

#[test]
fn test_rejects_short_records() {
    let (north, east, reference) = rotated_station(2_499, 10.0, 1);
    let err = estimate_azimuth(&north, &east, &reference, &AzimuthConfig::default()).unwrap_err();
    assert!(matches!(err, SeismicError::InsufficientData { actual: 2_499, .. }));
}

#[test]
fn test_rejects_silent_reference() {
    let (north, east, _) = rotated_station(5_000, 10.0, 1);
    let silent = vec![0.0; 5_000];
    let err = estimate_azimuth(&north, &east, &silent, &AzimuthConfig::default()).unwrap_err();
    assert!(matches!(err, SeismicError::BandPolicy(_)));
}
