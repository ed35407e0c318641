//! Windowed azimuth inversion.
//!
//! # Pipeline Overview
//!
//! 1. Locate the microseismic peak on the reference channel
//! 2. Derive the pass band from the peak
//! 3. Slice overlapping windows from all three channels
//! 4. Demean and bandpass each window
//! 5. Solve for the rotation angle, seeded by the previous window
//! 6. Average the best-correlated windows away from the 0/360 seam
//! 7. Verify the estimate on the whole (block-filtered) series

use levenberg_marquardt::LevenbergMarquardt;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::AzimuthConfig;
use crate::error::{Result, SeismicError};
use crate::inversion::filter::{BandpassFilter, CornerFrequencies};
use crate::inversion::monitor::{InversionMonitor, NoopMonitor};
use crate::inversion::objective::{ContinuityPrior, CorrelationObjective};
use crate::inversion::peak::SpectralPeakFinder;
use crate::math::stats::{
    angle_difference_degrees, demean, mean, population_std_dev, shifted_angle_mean,
    wrap_degrees,
};

/// Lifecycle of one inversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InversionState {
    /// Nothing processed yet.
    #[default]
    Init,
    /// Peak search and window layout.
    Windowing,
    /// Solving the given window.
    Solving { window: usize },
    /// Combining window solutions.
    Aggregation,
    /// Result produced.
    Done,
    /// Stopped by the caller at a window boundary.
    Cancelled,
    /// Aborted by an error.
    Failed,
}

/// Converged angle of one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowSolution {
    /// Window index.
    pub index: usize,
    /// First sample of the window.
    pub start: usize,
    /// Rotation angle in degrees, `[0, 360)`.
    pub theta: f64,
    /// Pearson correlation + 1, in `[0, 2]`.
    pub correlation: f64,
    /// Objective evaluations used by the solver.
    pub evaluations: usize,
}

impl WindowSolution {
    /// Solution with only an angle and correlation (index/start/evaluations zero).
    #[must_use]
    pub const fn new(theta: f64, correlation: f64) -> Self {
        Self {
            index: 0,
            start: 0,
            theta,
            correlation,
            evaluations: 0,
        }
    }
}

/// Aggregate over the best-correlated windows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aggregate {
    /// Mean angle of the best subset, degrees.
    pub best_theta: f64,
    /// Population standard deviation of the subset around `best_theta`, degrees.
    pub standard_deviation: f64,
    /// Mean correlation (+1) of the subset.
    pub best_correlation: f64,
    /// Indices (into the input) of the subset, best first.
    pub best_windows: Vec<usize>,
}

/// Final output of an inversion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AzimuthResult {
    /// Estimated orientation offset, degrees in `[0, 360)`.
    pub best_theta: f64,
    /// Spread of the best subset, degrees.
    pub standard_deviation: f64,
    /// Mean correlation (+1) of the best subset.
    pub best_correlation: f64,
    /// Per-window angles, degrees.
    pub thetas: Vec<f64>,
    /// Per-window correlations (+1).
    pub correlations: Vec<f64>,
    /// Per-window details.
    pub windows: Vec<WindowSolution>,
    /// Indices of the windows used for the estimate, best first.
    pub best_windows: Vec<usize>,
    /// Microseismic peak of the reference channel, Hz.
    pub peak_frequency: f64,
    /// Pass band used for window filtering.
    pub corners: CornerFrequencies,
    /// Correlation of the whole block-filtered series at `best_theta`.
    pub full_series_correlation: f64,
}

/// Combine window solutions into a single angle estimate.
///
/// The top `best_fraction` of windows by correlation (rounded up, at least
/// one) are kept. Their angles are averaged after moving the best window's
/// angle to `wrap_shift_degrees`, so clusters straddling 0/360 average
/// correctly.
///
/// The standard deviation is taken over the shortest angular differences
/// from the mean, not over the raw angles, so a subset such as
/// `[359, 1]` reports a spread of 1 degree rather than 179.
///
/// # Errors
///
/// Returns [`SeismicError::InsufficientData`] for an empty slice.
pub fn aggregate(windows: &[WindowSolution], config: &AzimuthConfig) -> Result<Aggregate> {
    if windows.is_empty() {
        return Err(SeismicError::insufficient_data(1, 0));
    }

    let mut order: Vec<usize> = (0..windows.len()).collect();
    order.sort_by(|&a, &b| windows[b].correlation.total_cmp(&windows[a].correlation));

    let keep = ((windows.len() as f64 * config.best_fraction).ceil() as usize).clamp(1, windows.len());
    order.truncate(keep);

    let thetas: Vec<f64> = order.iter().map(|&i| windows[i].theta).collect();
    let correlations: Vec<f64> = order.iter().map(|&i| windows[i].correlation).collect();

    let best_theta = shifted_angle_mean(&thetas, thetas[0], config.wrap_shift_degrees);
    let standard_deviation = population_std_dev(
        thetas
            .iter()
            .map(|&t| angle_difference_degrees(t, best_theta)),
    );

    Ok(Aggregate {
        best_theta,
        standard_deviation,
        best_correlation: mean(&correlations),
        best_windows: order,
    })
}

/// Estimates a sensor's horizontal orientation offset against a reference.
///
/// # Example
///
/// ```no_run
/// use seismic_core::{AzimuthConfig, AzimuthInversionEngine};
///
/// # let (north, east, reference) = (vec![0.0; 10_000], vec![0.0; 10_000], vec![0.0; 10_000]);
/// let mut engine = AzimuthInversionEngine::new(AzimuthConfig::default())?;
/// let result = engine.process(&north, &east, &reference)?;
/// println!("offset {:.1} deg +/- {:.1}", result.best_theta, result.standard_deviation);
/// # Ok::<(), seismic_core::SeismicError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AzimuthInversionEngine {
    config: AzimuthConfig,
    state: InversionState,
}

impl AzimuthInversionEngine {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: AzimuthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: InversionState::Init,
        })
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &AzimuthConfig {
        &self.config
    }

    /// State reached by the most recent run.
    #[must_use]
    pub const fn state(&self) -> InversionState {
        self.state
    }

    /// Run the inversion without progress reporting or cancellation.
    ///
    /// # Errors
    ///
    /// See [`process_with_monitor`](Self::process_with_monitor).
    pub fn process(
        &mut self,
        north: &[f64],
        east: &[f64],
        reference: &[f64],
    ) -> Result<AzimuthResult> {
        self.process_with_monitor(north, east, reference, &NoopMonitor)
    }

    /// Run the inversion, polling `monitor` at every window boundary.
    ///
    /// # Errors
    ///
    /// - [`SeismicError::LengthMismatch`] / [`SeismicError::InsufficientData`] /
    ///   [`SeismicError::NumericalInstability`] for unusable input
    /// - [`SeismicError::BandPolicy`] if no usable peak or pass band exists
    /// - [`SeismicError::Convergence`] if any window's solve fails
    /// - [`SeismicError::Cancelled`] if the monitor requested a stop
    pub fn process_with_monitor<M: InversionMonitor + ?Sized>(
        &mut self,
        north: &[f64],
        east: &[f64],
        reference: &[f64],
        monitor: &M,
    ) -> Result<AzimuthResult> {
        self.state = InversionState::Init;
        let outcome = self.run(north, east, reference, monitor);
        self.state = match &outcome {
            Ok(_) => InversionState::Done,
            Err(err) if err.is_cancellation() => InversionState::Cancelled,
            Err(_) => InversionState::Failed,
        };
        if outcome.is_ok() {
            monitor.report_progress(100);
        }
        outcome
    }

    fn run<M: InversionMonitor + ?Sized>(
        &mut self,
        north: &[f64],
        east: &[f64],
        reference: &[f64],
        monitor: &M,
    ) -> Result<AzimuthResult> {
        validate_inputs(north, east, reference)?;
        let config = self.config.clone();
        let dt = config.sample_interval_seconds;

        let window_count = config.window_count(reference.len());
        if window_count == 0 {
            let required = (config.window_length.div_ceil(config.window_step) + 1) * config.window_step;
            return Err(SeismicError::insufficient_data(required, reference.len()));
        }

        self.state = InversionState::Windowing;
        let peak_frequency = SpectralPeakFinder::from_config(&config).find_peak(reference)?;
        let corners = CornerFrequencies::from_peak(peak_frequency, &config)?;
        info!(
            peak_frequency,
            low_corner_hz = corners.low_hz,
            high_corner_hz = corners.high_hz,
            windows = window_count,
            "starting azimuth inversion"
        );

        let window_filter = BandpassFilter::new(corners, config.window_poles, config.two_pass)?;
        let solver = LevenbergMarquardt::new()
            .with_ftol(config.solver_tolerance)
            .with_xtol(config.solver_epsilon)
            .with_gtol(config.solver_epsilon)
            .with_patience(config.solver_max_iterations);

        let mut windows = Vec::with_capacity(window_count);
        let mut prior: Option<ContinuityPrior> = None;
        let mut last_progress = 0u8;

        for index in 0..window_count {
            if monitor.is_cancelled() {
                warn!(completed = index, "azimuth inversion cancelled");
                return Err(SeismicError::cancelled(index));
            }
            self.state = InversionState::Solving { window: index };

            let start = index * config.window_step;
            let range = start..start + config.window_length;
            let prepare = |channel: &[f64]| window_filter.apply(&demean(&channel[range.clone()]), dt);
            let (north_w, east_w, reference_w) = (prepare(north), prepare(east), prepare(reference));

            let objective = CorrelationObjective::new(
                &north_w,
                &east_w,
                &reference_w,
                prior,
                config.solver_epsilon,
            )?
            .with_theta(prior.map_or(0.0, |p| p.theta));
            let (solved, report) = solver.minimize(objective);
            if !report.termination.was_successful() {
                return Err(SeismicError::convergence(
                    index,
                    format!(
                        "{:?} after {} evaluations",
                        report.termination, report.number_of_evaluations
                    ),
                ));
            }

            let theta = wrap_degrees(solved.theta());
            let correlation = solved.correlation(theta);
            let window = WindowSolution {
                index,
                start,
                theta,
                correlation: correlation + 1.0,
                evaluations: report.number_of_evaluations,
            };
            debug!(
                window = index,
                theta = window.theta,
                correlation = window.correlation,
                evaluations = window.evaluations,
                "window solved"
            );
            windows.push(window);
            prior = Some(ContinuityPrior { theta, correlation });

            let progress = (((index + 1) * 100) / window_count).min(99) as u8;
            if progress > last_progress {
                monitor.report_progress(progress);
                last_progress = progress;
            }
        }

        self.state = InversionState::Aggregation;
        let summary = aggregate(&windows, &config)?;
        let full_series_correlation =
            full_series_correlation(north, east, reference, corners, &config, summary.best_theta)?;

        info!(
            best_theta = summary.best_theta,
            standard_deviation = summary.standard_deviation,
            best_correlation = summary.best_correlation,
            full_series_correlation,
            "azimuth inversion complete"
        );

        Ok(AzimuthResult {
            best_theta: summary.best_theta,
            standard_deviation: summary.standard_deviation,
            best_correlation: summary.best_correlation,
            thetas: windows.iter().map(|w| w.theta).collect(),
            correlations: windows.iter().map(|w| w.correlation).collect(),
            windows,
            best_windows: summary.best_windows,
            peak_frequency,
            corners,
            full_series_correlation,
        })
    }
}

/// Correlation of the whole series, block-filtered, rotated by `theta_degrees`.
fn full_series_correlation(
    north: &[f64],
    east: &[f64],
    reference: &[f64],
    corners: CornerFrequencies,
    config: &AzimuthConfig,
    theta_degrees: f64,
) -> Result<f64> {
    let block_filter = BandpassFilter::new(corners, config.block_poles, config.two_pass)?;
    let dt = config.sample_interval_seconds;
    let prepare = |channel: &[f64]| block_filter.apply(&demean(channel), dt);
    let (north_f, east_f, reference_f) = (prepare(north), prepare(east), prepare(reference));
    let objective = CorrelationObjective::new(
        &north_f,
        &east_f,
        &reference_f,
        None,
        config.solver_epsilon,
    )?;
    Ok(objective.correlation(theta_degrees))
}

fn validate_inputs(north: &[f64], east: &[f64], reference: &[f64]) -> Result<()> {
    if north.len() != east.len() || north.len() != reference.len() {
        return Err(SeismicError::length_mismatch(
            north.len(),
            east.len(),
            reference.len(),
        ));
    }
    for (name, channel) in [("north", north), ("east", east), ("reference", reference)] {
        if let Some(i) = channel.iter().position(|v| !v.is_finite()) {
            return Err(SeismicError::numerical_instability(format!(
                "non-finite {name} sample at index {i}"
            )));
        }
    }
    Ok(())
}

/// Run a one-off inversion with the given configuration.
///
/// # Errors
///
/// See [`AzimuthInversionEngine::process_with_monitor`].
pub fn estimate_azimuth(
    north: &[f64],
    east: &[f64],
    reference: &[f64],
    config: &AzimuthConfig,
) -> Result<AzimuthResult> {
    AzimuthInversionEngine::new(config.clone())?.process(north, east, reference)
}
