//! Error taxonomy for the codec.
//!
//! Decoder failures are fatal and non-recoverable: once the state machine
//! (see [`crate::decoder::state`]) observes one, every subsequent call
//! returns the same error. Encoder failures are limited to API misuse —
//! the encoder never produces malformed output for well-formed input.

use thiserror::Error;

/// Decoder fault classes, one variant per distinct way a stream can be
/// malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("malformed metablock: {0}")]
    MalformedMetablock(&'static str),

    #[error("malformed context map: {0}")]
    MalformedContextMap(&'static str),

    #[error("malformed huffman code: {0}")]
    MalformedHuffman(&'static str),

    #[error("invalid distance {distance} (max {max})")]
    InvalidDistance { distance: u64, max: u64 },

    #[error("invalid copy length {length} (remaining {remaining})")]
    InvalidCopyLength { length: u32, remaining: u32 },

    #[error("non-zero padding bits at metablock end")]
    PadNonZero,

    #[error("input underflow: {0}")]
    InputUnderflow(&'static str),

    #[error("operation invoked in wrong state: {0}")]
    ApiMisuse(&'static str),

    #[error("output would exceed the configured maximum size")]
    OutputTooLarge,
}

impl DecodeError {
    /// The small negative exit code used by the historical C API, preserved
    /// here so callers porting fault-code comparisons have something stable
    /// to match on.
    pub fn exit_code(&self) -> i32 {
        match self {
            DecodeError::MalformedHeader(_) => -1,
            DecodeError::MalformedMetablock(_) => -2,
            DecodeError::MalformedContextMap(_) => -3,
            DecodeError::MalformedHuffman(_) => -4,
            DecodeError::PadNonZero => -5,
            DecodeError::InvalidDistance { .. } => -9,
            DecodeError::InvalidCopyLength { .. } => -10,
            DecodeError::ApiMisuse(_) => -12,
            DecodeError::InputUnderflow(_) => -16,
            DecodeError::OutputTooLarge => -20,
        }
    }
}

/// Encoder failure modes: API misuse or invalid configuration only. The
/// encoder never fails part-way through a well-formed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("operation invoked in wrong state: {0}")]
    ApiMisuse(&'static str),

    #[error("quality must be in 0..=11, got {0}")]
    InvalidQuality(u8),

    #[error("lgwin must be in 10..=24 (or 10..=30 with large_window), got {0}")]
    InvalidWindowBits(u8),

    #[error("allocation failed while growing the output buffer")]
    AllocationFailed,
}

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;
