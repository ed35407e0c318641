//! Steim2 frame extraction.
//!
//! A frame is 64 bytes, sixteen 32-bit words. Word 0 carries sixteen 2-bit
//! keys, one per word (its own included), most significant pair first. Each
//! key, together with the top two bits of the data word ("dnib") for keys
//! `10` and `11`, selects how many signed differences the word packs:
//!
//! | key | dnib | layout |
//! |-----|------|--------|
//! | 01  | -    | 4 x 8-bit |
//! | 10  | 01   | 1 x 30-bit |
//! | 10  | 10   | 2 x 15-bit |
//! | 10  | 11   | 3 x 10-bit |
//! | 11  | 00   | 5 x 6-bit |
//! | 11  | 01   | 6 x 5-bit |
//! | 11  | 10   | 7 x 4-bit |
//!
//! Byte order only affects how the four bytes of a word are assembled; the
//! bit layout inside the assembled word is fixed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeismicError};

/// Size of one frame in bytes.
pub const FRAME_SIZE: usize = 64;

/// Number of 32-bit words per frame.
pub const WORDS_PER_FRAME: usize = 16;

/// Byte order of the 32-bit words in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ByteOrder {
    /// Most significant byte first (SEED default).
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// Assemble four bytes into a word.
    #[inline]
    #[must_use]
    pub const fn read_word(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
        }
    }

    /// Split a word into four bytes.
    #[inline]
    #[must_use]
    pub const fn write_word(self, word: u32) -> [u8; 4] {
        match self {
            Self::Big => word.to_be_bytes(),
            Self::Little => word.to_le_bytes(),
        }
    }
}

/// Packing of signed differences inside one data word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packing {
    /// Four 8-bit differences (key 01).
    Four8,
    /// One 30-bit difference (key 10, dnib 01).
    One30,
    /// Two 15-bit differences (key 10, dnib 10).
    Two15,
    /// Three 10-bit differences (key 10, dnib 11).
    Three10,
    /// Five 6-bit differences (key 11, dnib 00).
    Five6,
    /// Six 5-bit differences (key 11, dnib 01).
    Six5,
    /// Seven 4-bit differences (key 11, dnib 10).
    Seven4,
}

impl Packing {
    /// Resolve a data-word packing from its key and the word's top two bits.
    ///
    /// # Errors
    ///
    /// Returns a format error for the reserved dnib combinations.
    pub fn resolve(key: u8, word: u32) -> Result<Self> {
        let dnib = (word >> 30) & 0x03;
        match (key, dnib) {
            (0b01, _) => Ok(Self::Four8),
            (0b10, 0b01) => Ok(Self::One30),
            (0b10, 0b10) => Ok(Self::Two15),
            (0b10, 0b11) => Ok(Self::Three10),
            (0b11, 0b00) => Ok(Self::Five6),
            (0b11, 0b01) => Ok(Self::Six5),
            (0b11, 0b10) => Ok(Self::Seven4),
            _ => Err(SeismicError::format(format!(
                "invalid dnib {dnib:02b} for key {key:02b}"
            ))),
        }
    }

    /// Number of differences in the word.
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Self::One30 => 1,
            Self::Two15 => 2,
            Self::Three10 => 3,
            Self::Four8 => 4,
            Self::Five6 => 5,
            Self::Six5 => 6,
            Self::Seven4 => 7,
        }
    }

    /// Bit width of each difference.
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Self::One30 => 30,
            Self::Two15 => 15,
            Self::Three10 => 10,
            Self::Four8 => 8,
            Self::Five6 => 6,
            Self::Six5 => 5,
            Self::Seven4 => 4,
        }
    }

    /// Unpack the differences of `word`, first difference in the highest bits.
    pub fn unpack(self, word: u32) -> impl Iterator<Item = i32> {
        let count = self.count();
        let width = self.width();
        (0..count).map(move |i| sign_extend(word >> ((count - 1 - i) * width), width))
    }
}

/// Sign-extend the low `bits` bits of `value`.
///
/// The field is shifted up so its sign bit lands on bit 31, then shifted back
/// arithmetically.
#[inline]
#[must_use]
pub const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Forward and reverse integration constants carried by frame 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegrationConstants {
    /// X(0), the first sample of the record.
    pub forward: i32,
    /// X(n), the last sample of the record.
    pub reverse: i32,
}

/// Contents of one extracted frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameWords {
    /// Integration constants, present only for the record's first frame.
    pub constants: Option<IntegrationConstants>,
    /// Decoded differences in wire order.
    pub differences: Vec<i32>,
}

/// Decodes the data words of a single 64-byte frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameExtractor {
    byte_order: ByteOrder,
}

impl FrameExtractor {
    /// Create an extractor for the given word byte order.
    #[must_use]
    pub const fn new(byte_order: ByteOrder) -> Self {
        Self { byte_order }
    }

    /// Word byte order.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Extract the integration constants (first frame only) and differences.
    ///
    /// # Arguments
    ///
    /// * `frame` - Exactly [`FRAME_SIZE`] bytes
    /// * `first_frame` - Whether this is frame 0 of the record
    ///
    /// # Errors
    ///
    /// Returns a format error if the slice is not one frame long, if a
    /// non-empty key-`00` word appears where data is expected, or if a data
    /// word uses a reserved dnib.
    pub fn extract(&self, frame: &[u8], first_frame: bool) -> Result<FrameWords> {
        if frame.len() != FRAME_SIZE {
            return Err(SeismicError::format(format!(
                "frame must be {FRAME_SIZE} bytes, got {}",
                frame.len()
            )));
        }

        let words = self.read_words(frame);
        let keys = words[0];
        let mut out = FrameWords::default();

        let first_data_word = if first_frame {
            out.constants = Some(IntegrationConstants {
                forward: words[1] as i32,
                reverse: words[2] as i32,
            });
            3
        } else {
            1
        };

        for (index, &word) in words.iter().enumerate().skip(first_data_word) {
            let key = ((keys >> (30 - 2 * index)) & 0x03) as u8;
            if key == 0b00 {
                // All-zero key-00 words pad out a partially filled frame.
                if word != 0 {
                    return Err(SeismicError::format(format!(
                        "header word found mid-stream at word {index}"
                    )));
                }
                continue;
            }
            let packing = Packing::resolve(key, word)?;
            out.differences.extend(packing.unpack(word));
        }

        Ok(out)
    }

    fn read_words(&self, frame: &[u8]) -> [u32; WORDS_PER_FRAME] {
        let mut words = [0u32; WORDS_PER_FRAME];
        for (word, chunk) in words.iter_mut().zip(frame.chunks_exact(4)) {
            *word = self
                .byte_order
                .read_word([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        words
    }
}
