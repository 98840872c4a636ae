// Wire constants for the PC-60F notification stream

/// Frame start marker
pub const MAGIC: [u8; 2] = [0xAA, 0x55];

/// Magic (2) + Length (1)
pub const HEADER_SIZE: usize = 3;

/// Trailing CRC-8/MAXIM byte
pub const CHECKSUM_SIZE: usize = 1;

/// Smallest number of bytes needed before a candidate can be inspected:
/// header plus the type byte
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + 1;

/// Default ceiling for the Length byte: every value the byte can hold.
/// A lower ceiling in [`DecoderConfig`](crate::DecoderConfig) rejects
/// implausible lengths early instead of waiting for their bytes.
pub const DEFAULT_MAX_LENGTH: u8 = u8::MAX;

/// Battery level assumed until the first battery frame arrives (percent)
pub const DEFAULT_BATTERY_PERCENT: u8 = 100;

/// Highest raw battery level reported by the device
pub const BATTERY_RAW_MAX: u8 = 3;

/// Vital data payload: spo2, hr, reserved, pi
pub const VITAL_PAYLOAD_SIZE: usize = 4;

/// Battery payload: raw level
pub const BATTERY_PAYLOAD_SIZE: usize = 1;

/// Mode payload: mode, function, two status bytes
pub const MODE_PAYLOAD_SIZE: usize = 4;

/// Offset subtracted from the 7-bit waveform magnitude
pub const WAVE_SAMPLE_OFFSET: i8 = 64;

/// Plethysmograph sample rate of the waveform stream
pub const WAVE_SAMPLE_RATE_HZ: f64 = 50.0;
