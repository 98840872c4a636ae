//! Tests for edge cases and configuration

mod common;

use common::*;
use pc60fw_lib::{FrameType, RawFrame};

#[test]
fn test_empty_feed() {
    let mut decoder = Decoder::new();
    let result = decoder.feed(&[]);
    assert!(result.is_empty());
    assert_eq!(decoder.buffered_len(), 0);
}

#[test]
fn test_garbage_between_frames() {
    let mut data = vec![0x01, 0x02];
    data.extend(hex_to_bytes(VITAL_FRAME));
    data.extend([0x55, 0xAA, 0x03]);
    data.extend(hex_to_bytes(MODE_FRAME));
    data.push(0x04);

    let result = Decoder::new().feed(&data);
    assert_eq!(result.frames.len(), 2);
    assert_eq!(result.undecoded.as_ref(), &[0x01, 0x02, 0x55, 0xAA, 0x03, 0x04]);
}

#[test]
fn test_double_aa_before_marker() {
    let mut data = vec![0xAA];
    data.extend(hex_to_bytes(VITAL_FRAME));
    let result = Decoder::new().feed(&data);
    assert_eq!(result.frames.len(), 1);
    assert_eq!(result.undecoded.as_ref(), &[0xAA]);
}

#[test]
fn test_reset_discards_partial_frame() {
    let frame = hex_to_bytes(VITAL_FRAME);
    let mut decoder = Decoder::new();
    decoder.feed(&frame[..6]);
    decoder.reset();

    // the tail alone is noise now
    let result = decoder.feed(&frame[6..]);
    assert!(result.frames.is_empty());
    assert_eq!(result.undecoded.as_ref(), &frame[6..]);
}

#[test]
fn test_long_frames_decode_by_default() {
    let long_wave = encode_frame(2, &[0x40; 40]).unwrap();
    let mut decoder = Decoder::new();
    let result = decoder.feed(&long_wave);
    assert_eq!(result.waves().next().unwrap().len(), 40);
    assert!(result.undecoded.is_empty());

    // the largest Length the byte can carry
    let longest = encode_frame(0x0F, &[0x11; 254]).unwrap();
    let result = decoder.feed(&[&longest[..], &hex_to_bytes(VITAL_FRAME)[..]].concat());
    assert_eq!(result.unknown().next().unwrap().payload.len(), 254);
    assert_eq!(result.vital_data().count(), 1);
    assert!(result.undecoded.is_empty());
}

#[test]
fn test_max_length_ceiling() {
    let long_wave = encode_frame(2, &[0x40; 40]).unwrap();
    let config = DecoderConfig {
        max_length: 32,
        ..Default::default()
    };

    let mut strict = Decoder::with_config(config);
    let result = strict.feed(&long_wave);
    assert!(result.frames.is_empty());
    assert_eq!(result.undecoded.as_ref(), long_wave.as_ref());
    assert_eq!(strict.buffered_len(), 0);
}

#[test]
fn test_frame_round_trip_through_decoder() {
    let frames = Decoder::new().feed(&session_stream()).frames;
    let encoded: Vec<u8> = frames.iter().flat_map(|f| f.to_bytes().unwrap().to_vec()).collect();
    assert_eq!(encoded, session_stream());
}

#[test]
fn test_raw_frame_encode() {
    let raw = RawFrame::new(FrameType::Battery, Bytes::from_static(&[0x02]));
    assert_eq!(raw.encode().unwrap(), hex_to_bytes(BATTERY_FRAME));
}
