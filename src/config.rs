//! Configuration for record decoding and azimuth inversion.
//!
//! This module provides [`DecoderConfig`] for the Steim2 codec and
//! [`AzimuthConfig`], which centralizes every tunable constant of the
//! windowed inversion, along with a few presets.
//!
//! # Example
//!
//! ```
//! use seismic_core::AzimuthConfig;
//!
//! // Nominal 1 Hz configuration
//! let config = AzimuthConfig::default();
//! assert_eq!(config.window_length, 2000);
//!
//! // Quick-look preset
//! let fast = AzimuthConfig::fast();
//! assert!(fast.validate().is_ok());
//! ```

use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codec::ByteOrder;
use crate::error::{Result, SeismicError};

/// Options for decoding one Steim2 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderConfig {
    /// Byte order of each 32-bit word on the wire.
    pub byte_order: ByteOrder,

    /// X(-1), the sample preceding the record. Zero means unset, in which case
    /// X(-1) is derived as X(0) minus the first difference.
    pub bias: i32,

    /// Compare the reverse integration constant even when it is declared as 0.
    pub strict_reverse_check: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Big,
            bias: 0,
            strict_reverse_check: false,
        }
    }
}

impl DecoderConfig {
    /// Set the word byte order.
    #[must_use]
    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the bias (X(-1)).
    #[must_use]
    pub const fn with_bias(mut self, bias: i32) -> Self {
        self.bias = bias;
        self
    }

    /// Enable/disable strict reverse-constant comparison.
    #[must_use]
    pub const fn with_strict_reverse_check(mut self, strict: bool) -> Self {
        self.strict_reverse_check = strict;
        self
    }
}

/// Smallest accepted solver epsilon.
///
/// Below this the quarter-epsilon finite-difference step no longer changes
/// the objective and the gradient collapses to zero at the starting angle.
pub const MIN_SOLVER_EPSILON: f64 = 1e-10;

/// Configuration for the windowed azimuth inversion.
///
/// The defaults assume a series sampled at 1 Hz: the fixed periodogram bin
/// range 52..=170 of a 512-point segment then spans periods of roughly
/// 3 to 10 seconds, the microseismic band.
///
/// # Windowing
///
/// - `window_length`: Samples per analysis window (default 2000).
/// - `window_step`: Advance between consecutive windows (default 500).
///
/// # Filtering
///
/// - `window_poles`: Butterworth poles used on each analysis window (6).
/// - `block_poles`: Poles used on whole-series filtering (2).
/// - `two_pass`: Apply the transfer function as `|H|^2` for zero phase.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AzimuthConfig {
    /// Sample interval of all three channels, in seconds.
    pub sample_interval_seconds: f64,

    /// Samples per analysis window.
    pub window_length: usize,

    /// Samples between the starts of consecutive windows.
    pub window_step: usize,

    /// Segment length of the averaged periodogram.
    pub psd_segment_length: usize,

    /// Hop between periodogram segments.
    pub psd_hop: usize,

    /// Inclusive periodogram bin range searched for the microseismic peak.
    pub peak_bin_range: RangeInclusive<usize>,

    /// Upper bound on the high corner frequency (Hz).
    pub max_high_corner_hz: f64,

    /// Lower bound on the low corner frequency (Hz).
    pub min_low_corner_hz: f64,

    /// Pole count for per-window filtering.
    pub window_poles: usize,

    /// Pole count for whole-series filtering.
    pub block_poles: usize,

    /// Zero-phase (two-pass) filtering.
    pub two_pass: bool,

    /// Fraction of windows, by count, kept for the final estimate.
    pub best_fraction: f64,

    /// Relative cost-reduction tolerance of the solver.
    pub solver_tolerance: f64,

    /// Step/gradient convergence epsilon of the solver, in degrees.
    ///
    /// Also sets the finite-difference step of the objective to a quarter of
    /// this value, so it must stay at or above [`MIN_SOLVER_EPSILON`].
    pub solver_epsilon: f64,

    /// Solver patience per window; the evaluation budget is twice this.
    pub solver_max_iterations: usize,

    /// Offset (degrees) added to the first angle before the shifted mean.
    pub wrap_shift_degrees: f64,
}

impl Default for AzimuthConfig {
    fn default() -> Self {
        Self {
            sample_interval_seconds: 1.0,
            window_length: 2000,
            window_step: 500,
            psd_segment_length: 512,
            psd_hop: 256,
            peak_bin_range: 52..=170,
            max_high_corner_hz: 0.33,
            min_low_corner_hz: 1.0 / 18.0,
            window_poles: 6,
            block_poles: 2,
            two_pass: true,
            best_fraction: 0.15,
            solver_tolerance: 0.01,
            solver_epsilon: 1e-6,
            solver_max_iterations: 100,
            wrap_shift_degrees: 45.0,
        }
    }
}

impl AzimuthConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit 1 Hz preset (identical to the defaults).
    #[must_use]
    pub fn one_hz() -> Self {
        Self::default()
    }

    /// Quick-look preset: lighter window filtering and a wider best subset.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            window_poles: 2,
            best_fraction: 0.25,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.sample_interval_seconds.is_nan() || self.sample_interval_seconds <= 0.0 {
            return Err(SeismicError::invalid_config(
                "sample_interval_seconds must be positive",
            ));
        }
        if self.window_length == 0 || self.window_step == 0 {
            return Err(SeismicError::invalid_config(
                "window_length and window_step must be non-zero",
            ));
        }
        if self.psd_segment_length < 2 || self.psd_hop == 0 {
            return Err(SeismicError::invalid_config(
                "psd_segment_length must be at least 2 and psd_hop non-zero",
            ));
        }
        if self.peak_bin_range.is_empty() {
            return Err(SeismicError::invalid_config("peak_bin_range is empty"));
        }
        for poles in [self.window_poles, self.block_poles] {
            if poles == 0 || poles % 2 != 0 {
                return Err(SeismicError::invalid_config(format!(
                    "pole count must be even and non-zero, got {poles}"
                )));
            }
        }
        if self.best_fraction.is_nan() || self.best_fraction <= 0.0 || self.best_fraction > 1.0 {
            return Err(SeismicError::invalid_config(
                "best_fraction must be in (0, 1]",
            ));
        }
        if self.solver_tolerance.is_nan()
            || self.solver_tolerance <= 0.0
            || self.solver_epsilon.is_nan()
            || self.solver_epsilon <= 0.0
        {
            return Err(SeismicError::invalid_config(
                "solver tolerance and epsilon must be positive",
            ));
        }
        if self.solver_epsilon < MIN_SOLVER_EPSILON {
            return Err(SeismicError::invalid_config(format!(
                "solver_epsilon must be at least {MIN_SOLVER_EPSILON:e}, got {:e}",
                self.solver_epsilon
            )));
        }
        if self.solver_max_iterations == 0 {
            return Err(SeismicError::invalid_config(
                "solver_max_iterations must be at least 1",
            ));
        }
        Ok(())
    }

    /// Number of analysis windows for a series of `total_samples`.
    ///
    /// `floor(total / step) - ceil(length / step)`, clamped at zero.
    #[must_use]
    pub const fn window_count(&self, total_samples: usize) -> usize {
        let available = total_samples / self.window_step;
        let consumed = self.window_length.div_ceil(self.window_step);
        available.saturating_sub(consumed)
    }

    /// Set the sample interval.
    #[must_use]
    pub const fn with_sample_interval(mut self, seconds: f64) -> Self {
        self.sample_interval_seconds = seconds;
        self
    }

    /// Set the window length and step.
    #[must_use]
    pub const fn with_windowing(mut self, length: usize, step: usize) -> Self {
        self.window_length = length;
        self.window_step = step;
        self
    }

    /// Set the per-window pole count.
    #[must_use]
    pub const fn with_window_poles(mut self, poles: usize) -> Self {
        self.window_poles = poles;
        self
    }

    /// Set the best-window fraction.
    #[must_use]
    pub const fn with_best_fraction(mut self, fraction: f64) -> Self {
        self.best_fraction = fraction;
        self
    }

    /// Set the solver tolerance, epsilon and per-window patience.
    #[must_use]
    pub const fn with_solver(mut self, tolerance: f64, epsilon: f64, max_iterations: usize) -> Self {
        self.solver_tolerance = tolerance;
        self.solver_epsilon = epsilon;
        self.solver_max_iterations = max_iterations;
        self
    }

    /// Set the periodogram bin range searched for the peak.
    #[must_use]
    pub fn with_peak_bin_range(mut self, range: RangeInclusive<usize>) -> Self {
        self.peak_bin_range = range;
        self
    }
}
