//! Decoder: stream/metablock header parsing plus the fused command loop
//! that turns a compressed bitstream back into bytes.

pub mod api;
pub mod command_loop;
pub mod metablock;

pub use api::{decode, decoded_size, Decoder};
