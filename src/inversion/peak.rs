//! Microseismic peak search over an averaged periodogram.

use tracing::debug;

use crate::config::AzimuthConfig;
use crate::error::{Result, SeismicError};
use crate::math::fft::{generate_window, real_forward, WindowFunction};
use crate::math::stats::demean;

/// Locates the dominant frequency inside a fixed periodogram bin range.
///
/// The power spectrum is averaged over Hamming-tapered segments
/// (Welch's method), converted to decibels, and searched for its maximum
/// within `bin_range`. The range is fixed in bins, not hertz: with the
/// default 512-point segments, bins 52..=170 cover periods of roughly
/// 3 to 10 seconds only when the series is sampled at 1 Hz.
#[derive(Debug, Clone)]
pub struct SpectralPeakFinder {
    segment_length: usize,
    hop: usize,
    bin_range: std::ops::RangeInclusive<usize>,
    sample_interval: f64,
}

impl SpectralPeakFinder {
    /// Create a peak finder from the inversion configuration.
    #[must_use]
    pub fn from_config(config: &AzimuthConfig) -> Self {
        Self {
            segment_length: config.psd_segment_length,
            hop: config.psd_hop,
            bin_range: config.peak_bin_range.clone(),
            sample_interval: config.sample_interval_seconds,
        }
    }

    /// Segment length in samples.
    #[must_use]
    pub const fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// Averaged power spectrum, bins `0..=segment_length / 2`.
    ///
    /// # Errors
    ///
    /// Returns [`SeismicError::InsufficientData`] if the series is shorter
    /// than one segment.
    pub fn averaged_power(&self, series: &[f64]) -> Result<Vec<f64>> {
        let n = self.segment_length;
        if series.len() < n {
            return Err(SeismicError::insufficient_data(n, series.len()));
        }

        let taper = generate_window(n, WindowFunction::Hamming);
        let n_freq = n / 2 + 1;
        let mut power = vec![0.0; n_freq];
        let mut segments = 0usize;

        let mut start = 0;
        while start + n <= series.len() {
            let tapered: Vec<f64> = demean(&series[start..start + n])
                .iter()
                .zip(taper.iter())
                .map(|(x, w)| x * w)
                .collect();
            let spectrum = real_forward(&tapered, n);
            for (acc, c) in power.iter_mut().zip(spectrum.iter()) {
                *acc += c.norm_sqr();
            }
            segments += 1;
            start += self.hop;
        }

        let scale = segments as f64;
        for p in &mut power {
            *p /= scale;
        }
        Ok(power)
    }

    /// Frequency (Hz) of the spectral maximum inside the bin range.
    ///
    /// # Errors
    ///
    /// Returns [`SeismicError::BandPolicy`] if the bin range holds no bins of
    /// the spectrum or no finite power, and
    /// [`SeismicError::InsufficientData`] for series shorter than a segment.
    pub fn find_peak(&self, series: &[f64]) -> Result<f64> {
        let power = self.averaged_power(series)?;

        let low = *self.bin_range.start();
        let high = (*self.bin_range.end()).min(power.len() - 1);
        if low > high {
            return Err(SeismicError::band_policy(format!(
                "bin range {low}..={} lies outside the {}-bin spectrum",
                self.bin_range.end(),
                power.len()
            )));
        }

        let (peak_bin, peak_db) = (low..=high)
            .map(|k| (k, 10.0 * power[k].log10()))
            .filter(|(_, db)| db.is_finite())
            .fold(None, |best: Option<(usize, f64)>, (k, db)| match best {
                Some((_, best_db)) if best_db >= db => best,
                _ => Some((k, db)),
            })
            .ok_or_else(|| SeismicError::band_policy("no spectral power in the search band"))?;

        let frequency = peak_bin as f64 / (self.segment_length as f64 * self.sample_interval);
        debug!(peak_bin, peak_db, frequency, "located microseismic peak");
        Ok(frequency)
    }
}
