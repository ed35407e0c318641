//! Steim2 codec for compressed seismic records.
//!
//! This module provides:
//! - [`frame`]: per-frame key/word extraction and sign extension
//! - [`steim2`]: record-level integration and integrity checks

pub mod frame;
pub mod steim2;

pub use frame::{ByteOrder, FrameExtractor, FrameWords, IntegrationConstants, Packing};
pub use steim2::{decode_steim2, DecodeWarning, DecodedSeries, FrameDiagnostics, Steim2Decoder};
