//! Fault-path coverage: malformed streams and invalid configuration should
//! each surface the specific `DecodeError`/`EncodeError` variant that
//! describes what went wrong, not just "something failed".

use brocodec::bitio::BitWriter;
use brocodec::{decode, encode, DecodeError, DecoderOptions, EncodeError, EncoderOptions, Quality, WindowSize};

#[test]
fn empty_input_is_an_underflow() {
    let err = decode(&[], &DecoderOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::InputUnderflow(_)));
}

#[test]
fn truncated_stream_header_is_an_underflow() {
    // A single zero byte isn't enough to supply the 6 header bits plus a
    // full prologue.
    let err = decode(&[0x00], &DecoderOptions::default()).unwrap_err();
    assert!(matches!(err, DecodeError::InputUnderflow(_)));
}

#[test]
fn nonzero_padding_before_uncompressed_payload_is_rejected() {
    let payload = [0u8; 20];

    let mut w = BitWriter::new();
    w.write_bits(0, 1); // not large window
    w.write_bits(12, 5); // lgwin 22
    w.write_bits(1, 1); // is_last
    w.write_bits(0, 1); // not last-empty
    w.write_bits(2, 3); // 2 nibbles for mlen
    w.write_bits(0x4, 4); // low nibble
    w.write_bits(0x1, 4); // high nibble -> mlen = 0x14 = 20
    w.write_bits(1, 1); // is_uncompressed

    // At this point 20 bits have been written, 4 bits short of the next
    // byte boundary. Those 4 bits must be zero padding; make them not.
    w.write_bits(0b1111, 4);
    w.align_to_byte();
    w.write_raw_bytes(&payload);
    let stream = w.finish();

    let err = decode(&stream, &DecoderOptions::default()).unwrap_err();
    assert_eq!(err, DecodeError::PadNonZero);
}

#[test]
fn output_size_cap_is_enforced() {
    let data = "a".repeat(4096);
    let compressed = encode(data.as_bytes(), &EncoderOptions::default()).unwrap();

    let options = DecoderOptions {
        max_output_size: Some(10),
        custom_dictionary: None,
    };
    let err = decode(&compressed, &options).unwrap_err();
    assert_eq!(err, DecodeError::OutputTooLarge);
}

#[test]
fn quality_above_eleven_is_rejected() {
    let err = Quality::new(12).unwrap_err();
    assert_eq!(err, EncodeError::InvalidQuality(12));
}

#[test]
fn lgwin_outside_ten_to_twentyfour_is_rejected() {
    assert_eq!(WindowSize::new(9).unwrap_err(), EncodeError::InvalidWindowBits(9));
    assert_eq!(WindowSize::new(25).unwrap_err(), EncodeError::InvalidWindowBits(25));
}

#[test]
fn large_window_extends_range_past_standard_limit() {
    assert!(WindowSize::new_large(28).is_ok());
    assert!(WindowSize::new_large(31).is_err());
}
