//! Error types for record decoding and azimuth inversion.
//!
//! Structural codec failures and every inversion failure are reported through
//! [`SeismicError`]. Non-fatal decode conditions are not errors; they travel
//! with the decoded samples as [`DecodeWarning`](crate::codec::DecodeWarning)s.

use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeismicError {
    /// Malformed compressed record (misaligned buffer, header mid-stream).
    #[error("Format error: {0}")]
    Format(String),

    /// A per-window solve failed; the whole inversion is aborted.
    #[error("Solver failed to converge in window {window}: {reason}")]
    Convergence { window: usize, reason: String },

    /// Cancellation was observed at a window boundary.
    #[error("Inversion cancelled after {completed_windows} completed windows")]
    Cancelled { completed_windows: usize },

    /// The requested spectral band cannot be evaluated.
    #[error("Band policy violation: {0}")]
    BandPolicy(String),

    /// The three channels do not share one length.
    #[error("Length mismatch: north={north}, east={east}, reference={reference}")]
    LengthMismatch {
        north: usize,
        east: usize,
        reference: usize,
    },

    /// Not enough samples for a single analysis window.
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Numerical computation resulted in NaN or Inf.
    #[error("Numerical instability: {context}")]
    NumericalInstability { context: String },
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, SeismicError>;

impl SeismicError {
    /// Create a format error.
    #[must_use]
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a convergence error for the given window.
    #[must_use]
    pub fn convergence(window: usize, reason: impl Into<String>) -> Self {
        Self::Convergence {
            window,
            reason: reason.into(),
        }
    }

    /// Create a cancellation error.
    #[must_use]
    pub const fn cancelled(completed_windows: usize) -> Self {
        Self::Cancelled { completed_windows }
    }

    /// Create a band policy error.
    #[must_use]
    pub fn band_policy(msg: impl Into<String>) -> Self {
        Self::BandPolicy(msg.into())
    }

    /// Create a channel length mismatch error.
    #[must_use]
    pub const fn length_mismatch(north: usize, east: usize, reference: usize) -> Self {
        Self::LengthMismatch {
            north,
            east,
            reference,
        }
    }

    /// Create an insufficient data error.
    #[must_use]
    pub const fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a numerical instability error.
    #[must_use]
    pub fn numerical_instability(context: impl Into<String>) -> Self {
        Self::NumericalInstability {
            context: context.into(),
        }
    }

    /// Whether this error is an expected, caller-initiated stop.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SeismicError::insufficient_data(2000, 1500);
        assert!(err.to_string().contains("2000"));
        assert!(err.to_string().contains("1500"));

        let err = SeismicError::convergence(7, "singular normal equations");
        assert!(err.to_string().contains("window 7"));
    }

    #[test]
    fn test_error_constructors() {
        let _ = SeismicError::format("test");
        let _ = SeismicError::band_policy("test");
        let _ = SeismicError::length_mismatch(1, 2, 3);
        let _ = SeismicError::invalid_config("test");
        let _ = SeismicError::numerical_instability("test");
    }

    #[test]
    fn test_cancellation_flag() {
        assert!(SeismicError::cancelled(0).is_cancellation());
        assert!(!SeismicError::format("bad").is_cancellation());
    }
}
