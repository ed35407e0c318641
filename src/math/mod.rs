//! Numerical utilities shared by the inversion.
//!
//! This module provides:
//! - [`fft`]: windowing and real-signal FFT helpers
//! - [`stats`]: correlation, moments, and angle wrapping

pub mod fft;
pub mod stats;

pub use fft::{generate_window, real_forward, real_inverse, WindowFunction};
pub use stats::{demean, mean, pearson_correlation, shifted_angle_mean, wrap_degrees};
