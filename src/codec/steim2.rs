//! Steim2 record decoding.
//!
//! [`Steim2Decoder`] walks the frames of a record with a
//! [`FrameExtractor`], integrates the differences into samples, and checks
//! the result against the declared sample count and the reverse integration
//! constant. Both checks are non-fatal: a mismatch is attached to the
//! [`DecodedSeries`] as a [`DecodeWarning`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::{debug, warn};

use crate::codec::frame::{ByteOrder, FrameExtractor, IntegrationConstants, FRAME_SIZE};
use crate::config::DecoderConfig;
use crate::error::{Result, SeismicError};

/// Non-fatal integrity conditions found while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecodeWarning {
    /// The record produced a different number of samples than requested.
    SampleCountMismatch { expected: usize, actual: usize },
    /// The last sample differs from the declared reverse integration constant.
    ReverseIntegrationMismatch { expected: i32, actual: i32 },
}

/// Per-frame integrity telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameDiagnostics {
    /// Frame index within the record.
    pub index: usize,
    /// Samples emitted from this frame.
    pub samples: usize,
    /// First sample emitted from this frame, if any.
    pub forward_value: Option<i32>,
    /// Running value at the end of this frame.
    pub reverse_value: Option<i32>,
}

/// Result of decoding one record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedSeries {
    /// Reconstructed samples.
    pub samples: Vec<i32>,
    /// Integrity warnings; empty for a clean record.
    pub warnings: Vec<DecodeWarning>,
    /// Diagnostics for every frame that was read.
    pub frames: Vec<FrameDiagnostics>,
    /// Constants declared by frame 0, absent for an empty record.
    pub constants: Option<IntegrationConstants>,
}

impl DecodedSeries {
    /// Whether the decode produced no warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of decoded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Consume the series, keeping only the samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }
}

/// Running integration state threaded through the frames of one record.
#[derive(Debug, Clone, Copy, Default)]
struct DecoderState {
    /// Last emitted value, or the bias before the first sample.
    last_value: Option<i32>,
    /// Index of the frame being decoded.
    frame_index: usize,
}

/// Stateless Steim2 decoder.
///
/// # Example
///
/// ```
/// use seismic_core::{DecoderConfig, Steim2Decoder};
///
/// let decoder = Steim2Decoder::new(DecoderConfig::default());
/// let empty = decoder.decode(&[], 0)?;
/// assert!(empty.is_empty());
/// assert!(decoder.decode(&[0u8; 100], 10).is_err());
/// # Ok::<(), seismic_core::SeismicError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Steim2Decoder {
    config: DecoderConfig,
}

impl Steim2Decoder {
    /// Create a decoder with the given options.
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decoder options.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode up to `sample_count` samples from a frame-aligned record.
    ///
    /// Frames past the one that completes `sample_count` are not read.
    ///
    /// # Errors
    ///
    /// Returns [`SeismicError::Format`] if the buffer length is not a
    /// multiple of 64 or a frame is structurally invalid.
    pub fn decode(&self, buffer: &[u8], sample_count: usize) -> Result<DecodedSeries> {
        if buffer.len() % FRAME_SIZE != 0 {
            return Err(SeismicError::format(format!(
                "record length {} is not a multiple of {FRAME_SIZE}",
                buffer.len()
            )));
        }

        let extractor = FrameExtractor::new(self.config.byte_order);
        let mut series = DecodedSeries {
            samples: Vec::with_capacity(sample_count),
            ..DecodedSeries::default()
        };
        let mut state = DecoderState {
            last_value: (self.config.bias != 0).then_some(self.config.bias),
            frame_index: 0,
        };

        for frame in buffer.chunks_exact(FRAME_SIZE) {
            if series.samples.len() >= sample_count {
                break;
            }

            let words = extractor.extract(frame, state.frame_index == 0)?;
            if let Some(constants) = words.constants {
                series.constants = Some(constants);
            }

            let before = series.samples.len();
            let mut forward_value = None;
            for &difference in &words.differences {
                if series.samples.len() >= sample_count {
                    break;
                }
                let value = match state.last_value {
                    Some(last) => last.wrapping_add(difference),
                    // Unset bias: X(-1) = X(0) - d(0), so the first sample is X(0).
                    None => series.constants.map_or(difference, |c| c.forward),
                };
                forward_value.get_or_insert(value);
                series.samples.push(value);
                state.last_value = Some(value);
            }

            series.frames.push(FrameDiagnostics {
                index: state.frame_index,
                samples: series.samples.len() - before,
                forward_value,
                reverse_value: state.last_value,
            });
            state.frame_index += 1;
        }

        self.validate(&mut series, sample_count);

        debug!(
            frames = series.frames.len(),
            samples = series.samples.len(),
            requested = sample_count,
            "decoded steim2 record"
        );
        for warning in &series.warnings {
            warn!(?warning, "steim2 integrity check failed");
        }

        Ok(series)
    }

    fn validate(&self, series: &mut DecodedSeries, sample_count: usize) {
        if series.samples.len() != sample_count {
            series.warnings.push(DecodeWarning::SampleCountMismatch {
                expected: sample_count,
                actual: series.samples.len(),
            });
        }

        // A declared reverse constant of 0 is indistinguishable from "absent"
        // and is only compared in strict mode.
        if let (Some(constants), Some(&last)) = (series.constants, series.samples.last()) {
            let declared = constants.reverse;
            if declared != last && (declared != 0 || self.config.strict_reverse_check) {
                series.warnings.push(DecodeWarning::ReverseIntegrationMismatch {
                    expected: declared,
                    actual: last,
                });
            }
        }
    }
}

/// Decode a Steim2 record with a one-off decoder.
///
/// # Arguments
///
/// * `buffer` - Frame-aligned compressed bytes
/// * `sample_count` - Number of samples declared for the record
/// * `byte_order` - Word byte order
/// * `bias` - X(-1); 0 means derive it from frame 0
///
/// # Errors
///
/// See [`Steim2Decoder::decode`].
pub fn decode_steim2(
    buffer: &[u8],
    sample_count: usize,
    byte_order: ByteOrder,
    bias: i32,
) -> Result<DecodedSeries> {
    let config = DecoderConfig::default()
        .with_byte_order(byte_order)
        .with_bias(bias);
    Steim2Decoder::new(config).decode(buffer, sample_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::frame::WORDS_PER_FRAME;

    /// Assemble one frame from (word index, key, word) triples.
    fn frame(constants: Option<(i32, i32)>, data: &[(usize, u32, u32)]) -> [u32; WORDS_PER_FRAME] {
        let mut words = [0u32; WORDS_PER_FRAME];
        if let Some((forward, reverse)) = constants {
            words[1] = forward as u32;
            words[2] = reverse as u32;
        }
        for &(index, key, word) in data {
            words[0] |= key << (30 - 2 * index);
            words[index] = word;
        }
        words
    }

    fn to_bytes(frames: &[[u32; WORDS_PER_FRAME]], order: ByteOrder) -> Vec<u8> {
        frames
            .iter()
            .flatten()
            .flat_map(|&w| order.write_word(w))
            .collect()
    }

    /// 3 x 10-bit word holding 5, -3, 2.
    fn three_diffs() -> u32 {
        (0b11 << 30) | (5 << 20) | ((-3i32 as u32 & 0x3FF) << 10) | 2
    }

    #[test]
    fn test_cumulative_sum_single_frame() {
        let bytes = to_bytes(&[frame(Some((5, 4)), &[(3, 0b10, three_diffs())])], ByteOrder::Big);
        let series = decode_steim2(&bytes, 3, ByteOrder::Big, 0).unwrap();
        assert_eq!(series.samples, vec![5, 2, 4]);
        assert!(series.is_clean());
    }

    #[test]
    fn test_explicit_bias_seeds_accumulator() {
        let bytes = to_bytes(&[frame(Some((15, 14)), &[(3, 0b10, three_diffs())])], ByteOrder::Big);
        let series = decode_steim2(&bytes, 3, ByteOrder::Big, 10).unwrap();
        assert_eq!(series.samples, vec![15, 12, 14]);
        assert!(series.is_clean());
    }

    #[test]
    fn test_little_endian_words() {
        let frames = [frame(Some((5, 4)), &[(3, 0b10, three_diffs())])];
        let series = decode_steim2(&to_bytes(&frames, ByteOrder::Little), 3, ByteOrder::Little, 0)
            .unwrap();
        assert_eq!(series.samples, vec![5, 2, 4]);
    }

    #[test]
    fn test_sample_count_mismatch_is_warning() {
        // Seven 4-bit differences of 1
        let word = (0b10 << 30) | 0x111_1111;
        let bytes = to_bytes(&[frame(Some((1, 7)), &[(3, 0b11, word)])], ByteOrder::Big);
        let series = decode_steim2(&bytes, 10, ByteOrder::Big, 0).unwrap();
        assert_eq!(series.len(), 7);
        assert!(series.warnings.contains(&DecodeWarning::SampleCountMismatch {
            expected: 10,
            actual: 7
        }));
    }

    #[test]
    fn test_reverse_constant_mismatch() {
        let bytes = to_bytes(&[frame(Some((5, 99)), &[(3, 0b10, three_diffs())])], ByteOrder::Big);
        let series = decode_steim2(&bytes, 3, ByteOrder::Big, 0).unwrap();
        assert_eq!(
            series.warnings,
            vec![DecodeWarning::ReverseIntegrationMismatch {
                expected: 99,
                actual: 4
            }]
        );
    }

    #[test]
    fn test_zero_reverse_constant_needs_strict_mode() {
        let bytes = to_bytes(&[frame(Some((5, 0)), &[(3, 0b10, three_diffs())])], ByteOrder::Big);

        let lenient = Steim2Decoder::default().decode(&bytes, 3).unwrap();
        assert!(lenient.is_clean());

        let strict = Steim2Decoder::new(DecoderConfig::default().with_strict_reverse_check(true))
            .decode(&bytes, 3)
            .unwrap();
        assert_eq!(strict.warnings.len(), 1);
    }

    #[test]
    fn test_partial_read_skips_trailing_frames() {
        let first = frame(Some((1, 8)), &[(3, 0b01, 0x01_01_01_01)]);
        // Would be rejected if read
        let mut broken = [0u32; WORDS_PER_FRAME];
        broken[4] = 0xFFFF_FFFF;

        let bytes = to_bytes(&[first, broken], ByteOrder::Big);
        let series = decode_steim2(&bytes, 4, ByteOrder::Big, 0).unwrap();
        assert_eq!(series.samples, vec![1, 2, 3, 4]);
        assert_eq!(series.frames.len(), 1);
    }

    #[test]
    fn test_frame_diagnostics() {
        let first = frame(Some((1, 9)), &[(3, 0b01, 0x01_01_01_01)]);
        let second = frame(None, &[(1, 0b01, 0x01_01_01_01), (2, 0b10, (0b01 << 30) | 1)]);
        let bytes = to_bytes(&[first, second], ByteOrder::Big);

        let series = decode_steim2(&bytes, 9, ByteOrder::Big, 0).unwrap();
        assert_eq!(series.samples, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(series.is_clean());
        assert_eq!(
            series.frames,
            vec![
                FrameDiagnostics {
                    index: 0,
                    samples: 4,
                    forward_value: Some(1),
                    reverse_value: Some(4)
                },
                FrameDiagnostics {
                    index: 1,
                    samples: 5,
                    forward_value: Some(5),
                    reverse_value: Some(9)
                },
            ]
        );
    }

    #[test]
    fn test_misaligned_buffer_rejected() {
        let err = decode_steim2(&[0u8; 100], 10, ByteOrder::Big, 0).unwrap_err();
        assert!(matches!(err, SeismicError::Format(_)));
    }

    #[test]
    fn test_empty_record() {
        let series = decode_steim2(&[], 0, ByteOrder::Big, 0).unwrap();
        assert!(series.is_empty());
        assert!(series.is_clean());
        assert!(series.constants.is_none());
    }
}
