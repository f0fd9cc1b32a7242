//! A from-scratch implementation of the brotli-family compression codec:
//! a Huffman-coded, LZ77-with-a-static-dictionary scheme built around
//! metablocks, context modeling, and a recent-distance cache.
//!
//! The decoder (`decoder`) is the stable half of this crate: it accepts
//! any conforming stream, including ones this crate's own encoder would
//! never produce. The encoder (`encoder`) trades some of the format's
//! expressiveness for a simpler, still fully conforming, implementation —
//! see `DESIGN.md` for exactly which corners were cut and why.

pub mod bitio;
pub mod config;
pub mod contextmap;
pub mod decoder;
pub mod dictionary;
pub mod encoder;
pub mod error;
pub mod huffman;
pub mod ringbuffer;
pub mod tables;

/// One-shot decompression. Equivalent to the reference `BrotliDecoderDecompress`.
pub use decoder::decode;
/// Decoded size without keeping the decoded bytes around, when only the
/// length is needed.
pub use decoder::decoded_size;
/// Streaming decompression context. Equivalent to `BrotliDecoderState`.
pub use decoder::Decoder;

/// One-shot compression. Equivalent to the reference `BrotliEncoderCompress`.
pub use encoder::encode;
/// Streaming compression context. Equivalent to `BrotliEncoderState`.
pub use encoder::Encoder;

pub use config::{DecoderOptions, EncoderOptions, Mode, Quality, WindowSize};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
