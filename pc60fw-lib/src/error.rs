use std::io;
use thiserror::Error;

/// Why a candidate frame at the front of the carry buffer was not accepted.
///
/// These never leave [`Decoder::feed`](crate::Decoder::feed); they drive the
/// resynchronization step and the diagnostic log lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Incomplete frame: {needed} more bytes required")]
    Incomplete { needed: usize },

    #[error("Candidate does not start with the 0xAA 0x55 marker")]
    InvalidMagic,

    #[error("Length byte {length} out of range (1..={max})")]
    LengthOutOfRange { length: u8, max: u8 },

    #[error("Checksum mismatch: frame carries {expected:#04x}, computed {computed:#04x}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    #[error("Payload too short for frame type {frame_type}: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        frame_type: u8,
        expected: usize,
        actual: usize,
    },
}

/// The primary error type for the `pc60fw-lib` library.
///
/// Decoding itself is infallible; this covers the surfaces around it.
#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid hex on line {line}: {source}")]
    InvalidHex {
        line: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Invalid timestamp on line {line}: {value:?}")]
    InvalidTimestamp { line: usize, value: String },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Payload of {0} bytes does not fit in a single frame")]
    PayloadTooLong(usize),

    #[error("Notification queue is closed")]
    QueueClosed,

    #[error("Notification queue is full")]
    QueueFull,

    #[error("Decoder task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
