//! Frequency-domain Butterworth bandpass.
//!
//! The filter is the cascade of an analog Butterworth high-pass at the low
//! corner and low-pass at the high corner, evaluated bin by bin on the FFT of
//! the zero-padded input. Each section pair uses the standard pole placement
//! `s^2 + a_k s + 1` with `a_k = 2 sin((2k + 1) pi / (2 n))`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::config::AzimuthConfig;
use crate::error::{Result, SeismicError};
use crate::math::fft::{real_forward, real_inverse};

/// Pass band derived from a peak frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerFrequencies {
    /// Low (high-pass) corner in Hz.
    pub low_hz: f64,
    /// High (low-pass) corner in Hz.
    pub high_hz: f64,
}

impl CornerFrequencies {
    /// Corners one octave either side of `peak_hz`, bounded by the
    /// configuration: `high = min(2 peak, max_high)`, `low = max(peak / 2, min_low)`.
    ///
    /// # Errors
    ///
    /// Returns [`SeismicError::BandPolicy`] if the resulting band is empty
    /// or not finite.
    pub fn from_peak(peak_hz: f64, config: &AzimuthConfig) -> Result<Self> {
        let high_hz = (2.0 * peak_hz).min(config.max_high_corner_hz);
        let low_hz = (peak_hz / 2.0).max(config.min_low_corner_hz);
        Self::new(low_hz, high_hz)
    }

    /// Explicit corners.
    ///
    /// # Errors
    ///
    /// Returns [`SeismicError::BandPolicy`] unless `0 < low < high`.
    pub fn new(low_hz: f64, high_hz: f64) -> Result<Self> {
        if !low_hz.is_finite() || !high_hz.is_finite() || low_hz <= 0.0 || low_hz >= high_hz {
            return Err(SeismicError::band_policy(format!(
                "empty pass band: low {low_hz} Hz, high {high_hz} Hz"
            )));
        }
        Ok(Self { low_hz, high_hz })
    }
}

/// Zero-phase (optionally) Butterworth bandpass applied via FFT.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    corners: CornerFrequencies,
    /// Section coefficients `a_k`, one per conjugate pole pair.
    section_coefficients: Vec<f64>,
    two_pass: bool,
}

impl BandpassFilter {
    /// Create a filter with `poles` poles per section.
    ///
    /// # Errors
    ///
    /// Returns [`SeismicError::InvalidConfig`] unless `poles` is even and
    /// non-zero.
    pub fn new(corners: CornerFrequencies, poles: usize, two_pass: bool) -> Result<Self> {
        if poles == 0 || poles % 2 != 0 {
            return Err(SeismicError::invalid_config(format!(
                "pole count must be even and non-zero, got {poles}"
            )));
        }
        let section_coefficients = (0..poles / 2)
            .map(|k| 2.0 * ((2 * k + 1) as f64 * PI / (2 * poles) as f64).sin())
            .collect();
        Ok(Self {
            corners,
            section_coefficients,
            two_pass,
        })
    }

    /// Pass band of this filter.
    #[must_use]
    pub const fn corners(&self) -> CornerFrequencies {
        self.corners
    }

    /// Number of poles per section.
    #[must_use]
    pub fn poles(&self) -> usize {
        self.section_coefficients.len() * 2
    }

    /// Complex response at `frequency_hz` (single pass).
    #[must_use]
    pub fn response(&self, frequency_hz: f64) -> Complex64 {
        if frequency_hz <= 0.0 {
            return Complex64::new(0.0, 0.0);
        }
        let one = Complex64::new(1.0, 0.0);
        let s_low = Complex64::new(0.0, frequency_hz / self.corners.high_hz);
        let s_high = Complex64::new(0.0, frequency_hz / self.corners.low_hz);

        let mut h = one;
        for &a in &self.section_coefficients {
            // Low-pass section 1 / (s^2 + a s + 1)
            h /= s_low * s_low + s_low * a + one;
            // High-pass section s^2 / (s^2 + a s + 1)
            h *= s_high * s_high;
            h /= s_high * s_high + s_high * a + one;
        }
        h
    }

    /// Filter `series` sampled every `sample_interval` seconds.
    ///
    /// The DC bin is always zeroed. With `two_pass`, every bin is scaled by
    /// `|H|^2`, the response of a forward plus time-reversed pass.
    #[must_use]
    pub fn apply(&self, series: &[f64], sample_interval: f64) -> Vec<f64> {
        let n = series.len();
        if n == 0 {
            return vec![];
        }
        let n_fft = (2 * n).next_power_of_two();
        let n_freq = n_fft / 2 + 1;
        let df = 1.0 / (n_fft as f64 * sample_interval);

        let mut spectrum = real_forward(series, n_fft);
        spectrum.truncate(n_freq);
        spectrum[0] = Complex64::new(0.0, 0.0);
        for (k, bin) in spectrum.iter_mut().enumerate().skip(1) {
            let h = self.response(k as f64 * df);
            if self.two_pass {
                *bin *= h.norm_sqr();
            } else {
                *bin *= h;
            }
        }

        let mut filtered = real_inverse(&spectrum, n_fft);
        filtered.truncate(n);
        filtered
    }
}
