//! Seismic Core Library
//!
//! Steim2 decoding and sensor orientation estimation for seismic stations.
//!
//! This library provides the two numerical cores of a station-quality
//! toolchain: a decoder for Steim2-compressed waveform records and an
//! inversion that estimates the horizontal misorientation of a sensor by
//! correlating its rotated components against a trusted reference channel.
//!
//! # Features
//!
//! - **Steim2 decoding**: Big- and little-endian frames, all seven packings,
//!   non-fatal sample-count and reverse-integration checks
//! - **Microseism band selection**: Welch periodogram peak search with a
//!   corner policy derived from the peak
//! - **Windowed inversion**: Levenberg-Marquardt per window, seeded and
//!   damped by the previous window's answer
//! - **Seam-safe aggregation**: Averages angles near 0/360 correctly
//! - **Cancellation**: Cooperative stop at window boundaries
//!
//! # Quick Start
//!
//! ```
//! use seismic_core::{decode_steim2, ByteOrder};
//!
//! // One frame: X0 = 5, Xn = 4, then a 3x10 word holding [5, -3, 2]
//! let mut frame = [0u8; 64];
//! frame[0..4].copy_from_slice(&(0b10u32 << 24).to_be_bytes());
//! frame[4..8].copy_from_slice(&5i32.to_be_bytes());
//! frame[8..12].copy_from_slice(&4i32.to_be_bytes());
//! let word = (0b11u32 << 30) | (5 << 20) | ((-3i32 as u32 & 0x3FF) << 10) | 2;
//! frame[12..16].copy_from_slice(&word.to_be_bytes());
//!
//! let series = decode_steim2(&frame, 3, ByteOrder::Big, 0)?;
//! assert_eq!(series.samples, vec![5, 2, 4]);
//! assert!(series.is_clean());
//! # Ok::<(), seismic_core::SeismicError>(())
//! ```
//!
//! # Orientation
//!
//! ```no_run
//! use seismic_core::{estimate_azimuth, AzimuthConfig};
//!
//! # let (north, east, reference) = (vec![0.0; 10_000], vec![0.0; 10_000], vec![0.0; 10_000]);
//! let result = estimate_azimuth(&north, &east, &reference, &AzimuthConfig::one_hz())?;
//! println!(
//!     "offset {:.1} deg, spread {:.1} deg, correlation {:.3}",
//!     result.best_theta, result.standard_deviation, result.best_correlation
//! );
//! # Ok::<(), seismic_core::SeismicError>(())
//! ```
//!
//! # Presets
//!
//! | Preset | Window poles | Best fraction | Use Case |
//! |--------|--------------|---------------|----------|
//! | `AzimuthConfig::one_hz()` | 6 | 0.15 | Long-period 1 Hz data |
//! | `AzimuthConfig::fast()` | 2 | 0.25 | Quick screening |

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod codec;
pub mod config;
pub mod error;
pub mod inversion;
pub mod math;

// Re-exports for convenient access
pub use codec::{decode_steim2, ByteOrder, DecodeWarning, DecodedSeries, Steim2Decoder};
pub use config::{AzimuthConfig, DecoderConfig};
pub use error::{Result, SeismicError};
pub use inversion::{
    aggregate, estimate_azimuth, AzimuthInversionEngine, AzimuthResult, BandpassFilter,
    CancellationToken, CornerFrequencies, CorrelationObjective, InversionMonitor,
    InversionState, NoopMonitor, SpectralPeakFinder, WindowSolution,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bytes per Steim2 frame.
pub const FRAME_SIZE: usize = codec::frame::FRAME_SIZE;
