//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use pc60fw_lib::{
    DecodeResult, Decoder, DecoderConfig, Frame, FrameKind, VitalData, encode_frame,
};

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    let digits: String = hex_data.split_whitespace().collect();
    Bytes::from(hex::decode(digits).expect("Failed to decode hex"))
}

/// Vital data: spo2 98, hr 75, pi 5.0
#[allow(dead_code)]
pub const VITAL_FRAME: &str = "aa 55 05 01 62 4b 00 32 20";

/// Waveform with five samples, peak on the third
#[allow(dead_code)]
pub const WAVE_FRAME: &str = "aa 55 06 02 40 45 c8 3a 30 ed";

/// Battery raw level 2
#[allow(dead_code)]
pub const BATTERY_FRAME: &str = "aa 55 02 03 02 71";

/// Spot-check mode, measuring
#[allow(dead_code)]
pub const MODE_FRAME: &str = "aa 55 05 21 01 02 00 00 7d";

/// Frames typical of a continuous session, in the order they are sent
#[allow(dead_code)]
pub fn session_stream() -> Vec<u8> {
    [WAVE_FRAME, VITAL_FRAME, WAVE_FRAME, BATTERY_FRAME, MODE_FRAME, WAVE_FRAME, VITAL_FRAME]
        .iter()
        .flat_map(|f| hex_to_bytes(f).to_vec())
        .collect()
}

/// Feed `data` split at the given offsets and merge the results
#[allow(dead_code)]
pub fn feed_split(decoder: &mut Decoder, data: &[u8], cuts: &[usize]) -> DecodeResult {
    let mut total = DecodeResult::default();
    let mut start = 0;
    for &cut in cuts.iter().chain(std::iter::once(&data.len())) {
        total.merge(decoder.feed(&data[start..cut]));
        start = cut;
    }
    total
}

/// Route decoder logs to the test harness; set RUST_LOG=debug to see them
#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
