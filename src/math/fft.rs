//! FFT helpers for real-valued series.
//!
//! Thin wrappers over `rustfft` for the two directions the inversion needs:
//! a zero-padded forward transform of a real series, and an inverse transform
//! from the non-negative half of a spectrum (the negative half is rebuilt by
//! conjugate symmetry).

use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Window function applied before a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFunction {
    /// No windowing (rectangular window).
    None,
    /// Hamming window, `0.54 - 0.46 cos(2 pi i / (n - 1))`.
    #[default]
    Hamming,
}

/// Generate window function coefficients.
#[must_use]
pub fn generate_window(n: usize, window: WindowFunction) -> Vec<f64> {
    match window {
        WindowFunction::None => vec![1.0; n],
        WindowFunction::Hamming => (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1).max(1) as f64;
                0.54 - 0.46 * (2.0 * PI * t).cos()
            })
            .collect(),
    }
}

/// Forward FFT of a real series, zero-padded (or truncated) to `n_fft` points.
#[must_use]
pub fn real_forward(signal: &[f64], n_fft: usize) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = signal
        .iter()
        .take(n_fft)
        .map(|&x| Complex64::new(x, 0.0))
        .collect();
    buffer.resize(n_fft, Complex64::new(0.0, 0.0));

    if n_fft > 0 {
        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(n_fft).process(&mut buffer);
    }
    buffer
}

/// Inverse FFT from the non-negative frequency half of a real signal's spectrum.
///
/// `half` holds bins `0..=n_fft / 2`; missing bins are treated as zero. The
/// result is scaled by `1 / n_fft`, so `real_inverse(&real_forward(x, n)[..=n/2], n)`
/// reproduces `x`.
#[must_use]
pub fn real_inverse(half: &[Complex64], n_fft: usize) -> Vec<f64> {
    if n_fft == 0 {
        return vec![];
    }
    let n_freq = n_fft / 2 + 1;

    let mut full = vec![Complex64::new(0.0, 0.0); n_fft];
    for (slot, c) in full.iter_mut().zip(half.iter().take(n_freq)) {
        *slot = *c;
    }
    // Mirror for conjugate symmetry (DC and, for even n_fft, Nyquist stay put)
    for k in 1..n_freq {
        let mirror = n_fft - k;
        if mirror > k {
            full[mirror] = full[k].conj();
        }
    }

    let mut planner = FftPlanner::new();
    planner.plan_fft_inverse(n_fft).process(&mut full);

    let scale = n_fft as f64;
    full.iter().map(|c| c.re / scale).collect()
}
