//! Tunables shared by the encoder and decoder: quality level, window size,
//! and content mode. Validates caller-supplied knobs once, up front, rather
//! than deep inside the hot loop.

use crate::error::EncodeError;

/// Encoder quality, `0..=11`:
/// 0 = uncompressed framing, 1 = fast single-pass, 2-4 = simple hasher,
/// 5-9 = hash chain + block splitting, 10 = Zopfli, 11 = two-pass HQ Zopfli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 11;
    pub const DEFAULT: u8 = 11;

    pub fn new(level: u8) -> Result<Self, EncodeError> {
        if level > Self::MAX {
            return Err(EncodeError::InvalidQuality(level));
        }
        Ok(Quality(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn uses_hash_chain(self) -> bool {
        (5..=9).contains(&self.0)
    }

    pub fn uses_zopfli(self) -> bool {
        self.0 >= 10
    }

    pub fn uses_simple_hasher(self) -> bool {
        (2..=4).contains(&self.0)
    }

    /// Maximum match length the Zopfli DP will consider at this quality.
    pub fn max_zopfli_len(self) -> usize {
        if self.0 >= 11 {
            325
        } else {
            150
        }
    }

    /// Maximum number of match candidates the Zopfli DP evaluates per
    /// position at this quality.
    pub fn max_zopfli_candidates(self) -> usize {
        if self.0 >= 11 {
            5
        } else {
            1
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality(Self::DEFAULT)
    }
}

/// Sliding window size. `lgwin in [10,24]` normally; `Large` extends that to
/// `[10,30]` via a wire-format extension bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSize {
    Standard(u8),
    Large(u8),
}

impl WindowSize {
    pub const DEFAULT_LGWIN: u8 = 22;

    pub fn new(lgwin: u8) -> Result<Self, EncodeError> {
        if !(10..=24).contains(&lgwin) {
            return Err(EncodeError::InvalidWindowBits(lgwin));
        }
        Ok(WindowSize::Standard(lgwin))
    }

    pub fn new_large(lgwin: u8) -> Result<Self, EncodeError> {
        if !(10..=30).contains(&lgwin) {
            return Err(EncodeError::InvalidWindowBits(lgwin));
        }
        Ok(WindowSize::Large(lgwin))
    }

    pub fn lgwin(self) -> u8 {
        match self {
            WindowSize::Standard(w) | WindowSize::Large(w) => w,
        }
    }

    /// `W = 2^lgwin`.
    pub fn window_size(self) -> usize {
        1usize << self.lgwin()
    }

    /// The decoder ring buffer is `W + 37` bytes: slack for over-copy in
    /// the LZ77 loop.
    pub fn ring_buffer_size(self) -> usize {
        self.window_size() + 37
    }

    pub fn is_large(self) -> bool {
        matches!(self, WindowSize::Large(_))
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize::Standard(Self::DEFAULT_LGWIN)
    }
}

/// Content mode. `Font` biases the distance-code alphabet via
/// `NPOSTFIX`/`NDIRECT` when quality >= 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Generic,
    Text,
    Font,
}

impl Mode {
    /// `(distance_postfix_bits, num_direct_distance_codes)`.
    pub fn distance_params(self, quality: Quality) -> (u32, u32) {
        if self == Mode::Font && quality.get() >= 4 {
            (1, 12)
        } else {
            (0, 0)
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncoderOptions {
    pub quality: Quality,
    pub window: WindowSize,
    pub mode: Mode,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            quality: Quality::default(),
            window: WindowSize::default(),
            mode: Mode::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecoderOptions<'a> {
    pub max_output_size: Option<usize>,
    pub custom_dictionary: Option<&'a [u8]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_rejects_out_of_range() {
        assert!(Quality::new(12).is_err());
        assert!(Quality::new(11).is_ok());
    }

    #[test]
    fn window_size_rejects_out_of_range() {
        assert!(WindowSize::new(9).is_err());
        assert!(WindowSize::new(25).is_err());
        assert_eq!(WindowSize::new(10).unwrap().window_size(), 1024);
    }

    #[test]
    fn font_mode_sets_distance_params_only_at_quality4plus() {
        let q3 = Quality::new(3).unwrap();
        let q4 = Quality::new(4).unwrap();
        assert_eq!(Mode::Font.distance_params(q3), (0, 0));
        assert_eq!(Mode::Font.distance_params(q4), (1, 12));
    }
}
