//! Bit-level I/O shared by the decoder and encoder.

mod reader;
mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;
