pub mod analysis;
pub mod capture;
pub mod config;
pub mod constants;
pub mod crc;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod message;
pub mod mode;
pub mod stream;
pub mod vital;
pub mod wave;


// Re-export the main types for easy access
pub use config::DecoderConfig;
pub use crc::crc8_maxim;
pub use decoder::{DecodeResult, Decoder};
pub use error::{DecoderError, FrameError};
pub use frame::{FrameType, RawFrame, encode_frame};
pub use message::{Frame, FrameKind, UnknownFrame};
pub use mode::{MeasureFunction, MeasureMode, ModeStatus};
pub use vital::{BatteryLevel, VitalData};
pub use wave::{WaveSample, Waveform};
