//! Incremental decoder for the oximeter notification stream.
//!
//! Chunks arrive with no regard for frame boundaries. The decoder keeps a
//! carry buffer between calls and walks it front to back:
//!
//! - bytes before the next `AA 55` marker are reported as undecoded
//! - a candidate's Length decides how many bytes it spans
//! - a candidate that fails validation only gives up its two marker bytes,
//!   so a real frame hiding inside it is still found on the next pass
//! - an incomplete candidate stays in the carry buffer for the next feed
//!
//! Every input byte ends up in exactly one of: a decoded frame, the
//! undecoded output of some feed, or the carry buffer.

use crate::config::DecoderConfig;
use crate::constants::{CHECKSUM_SIZE, HEADER_SIZE, MAGIC};
use crate::error::FrameError;
use crate::frame::RawFrame;
use crate::message::{Frame, FrameKind, UnknownFrame};
use crate::mode::ModeStatus;
use crate::vital::{BatteryLevel, VitalData};
use crate::wave::Waveform;
use bytes::{Buf, Bytes, BytesMut};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace, warn};

/// Callback invoked for each decoded frame of its registered kind
pub type Observer = Box<dyn FnMut(&Frame) + Send>;

/// Callback invoked with every chunk before it is decoded
pub type RawObserver = Box<dyn FnMut(&[u8]) + Send>;

/// Outcome of a single [`Decoder::feed`] call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeResult {
    /// Frames in stream order
    pub frames: Vec<Frame>,
    /// Bytes this call could not classify as part of a valid frame
    pub undecoded: Bytes,
}

impl DecodeResult {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.undecoded.is_empty()
    }

    pub fn waves(&self) -> impl Iterator<Item = &Waveform> {
        self.frames.iter().filter_map(|f| match f {
            Frame::Wave(wave) => Some(wave),
            _ => None,
        })
    }

    pub fn vital_data(&self) -> impl Iterator<Item = &VitalData> {
        self.frames.iter().filter_map(|f| match f {
            Frame::VitalData(data) => Some(data),
            _ => None,
        })
    }

    pub fn modes(&self) -> impl Iterator<Item = &ModeStatus> {
        self.frames.iter().filter_map(|f| match f {
            Frame::Mode(status) => Some(status),
            _ => None,
        })
    }

    pub fn batteries(&self) -> impl Iterator<Item = &BatteryLevel> {
        self.frames.iter().filter_map(|f| match f {
            Frame::Battery(level) => Some(level),
            _ => None,
        })
    }

    pub fn unknown(&self) -> impl Iterator<Item = &UnknownFrame> {
        self.frames.iter().filter_map(|f| match f {
            Frame::Unknown(unknown) => Some(unknown),
            _ => None,
        })
    }

    /// Append another result, keeping stream order
    pub fn merge(&mut self, other: DecodeResult) {
        self.frames.extend(other.frames);
        if !other.undecoded.is_empty() {
            let mut undecoded = BytesMut::from(self.undecoded.as_ref());
            undecoded.extend_from_slice(&other.undecoded);
            self.undecoded = undecoded.freeze();
        }
    }
}

/// Per-connection frame decoder.
///
/// Not internally synchronized: callers deliver chunks one at a time, in
/// arrival order. See [`crate::stream`] for a queue that guarantees this.
pub struct Decoder {
    config: DecoderConfig,
    carry: BytesMut,
    last_battery: u8,
    observers: HashMap<FrameKind, Observer>,
    raw_observer: Option<RawObserver>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("config", &self.config)
            .field("carry", &self.carry)
            .field("last_battery", &self.last_battery)
            .field("observers", &self.observers.keys().collect::<Vec<_>>())
            .field("raw_observer", &self.raw_observer.is_some())
            .finish()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            carry: BytesMut::with_capacity(256),
            last_battery: config.initial_battery,
            observers: HashMap::new(),
            raw_observer: None,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Battery percent attached to the next vital data frame
    pub fn last_battery(&self) -> u8 {
        self.last_battery
    }

    /// Bytes held over for the next feed
    pub fn buffered(&self) -> &[u8] {
        &self.carry
    }

    pub fn buffered_len(&self) -> usize {
        self.carry.len()
    }

    /// Route frames of `kind` to `observer`, replacing any previous one.
    pub fn register<F>(&mut self, kind: FrameKind, observer: F)
    where
        F: FnMut(&Frame) + Send + 'static,
    {
        self.observers.insert(kind, Box::new(observer));
    }

    /// Remove the observer for `kind`, returning whether one was set
    pub fn unregister(&mut self, kind: FrameKind) -> bool {
        self.observers.remove(&kind).is_some()
    }

    pub fn on_wave<F>(&mut self, mut observer: F)
    where
        F: FnMut(&Waveform) + Send + 'static,
    {
        self.register(FrameKind::Wave, move |frame| {
            if let Frame::Wave(wave) = frame {
                observer(wave)
            }
        });
    }

    pub fn on_vital_data<F>(&mut self, mut observer: F)
    where
        F: FnMut(&VitalData) + Send + 'static,
    {
        self.register(FrameKind::VitalData, move |frame| {
            if let Frame::VitalData(data) = frame {
                observer(data)
            }
        });
    }

    pub fn on_mode<F>(&mut self, mut observer: F)
    where
        F: FnMut(&ModeStatus) + Send + 'static,
    {
        self.register(FrameKind::Mode, move |frame| {
            if let Frame::Mode(status) = frame {
                observer(status)
            }
        });
    }

    pub fn on_battery<F>(&mut self, mut observer: F)
    where
        F: FnMut(&BatteryLevel) + Send + 'static,
    {
        self.register(FrameKind::Battery, move |frame| {
            if let Frame::Battery(level) = frame {
                observer(level)
            }
        });
    }

    pub fn on_unknown<F>(&mut self, mut observer: F)
    where
        F: FnMut(&UnknownFrame) + Send + 'static,
    {
        self.register(FrameKind::Unknown, move |frame| {
            if let Frame::Unknown(unknown) = frame {
                observer(unknown)
            }
        });
    }

    /// See every chunk as delivered, before framing
    pub fn set_raw_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.raw_observer = Some(Box::new(observer));
    }

    pub fn clear_raw_observer(&mut self) {
        self.raw_observer = None;
    }

    /// Drop any partial frame held over from earlier feeds.
    /// The battery level is kept.
    pub fn reset(&mut self) {
        if !self.carry.is_empty() {
            debug!("Discarding {} carried bytes", self.carry.len());
        }
        self.carry.clear();
    }

    /// Append `chunk` and decode every complete frame now available.
    ///
    /// Observers run synchronously, in stream order, before this returns.
    pub fn feed(&mut self, chunk: &[u8]) -> DecodeResult {
        if let Some(raw_observer) = self.raw_observer.as_mut() {
            raw_observer(chunk);
        }
        trace!("Feed {} bytes: {}", chunk.len(), hex::encode(chunk));

        self.carry.extend_from_slice(chunk);
        let mut frames = Vec::new();
        let mut undecoded = BytesMut::new();

        loop {
            match find_magic(&self.carry) {
                Some(0) => {}
                Some(offset) => undecoded.extend_from_slice(&self.carry.split_to(offset)),
                None => {
                    // a trailing 0xAA may be the first half of the next marker
                    let keep = usize::from(self.carry.last() == Some(&MAGIC[0]));
                    let skip = self.carry.len() - keep;
                    undecoded.extend_from_slice(&self.carry.split_to(skip));
                    break;
                }
            }

            match self.next_frame() {
                Ok(frame) => {
                    self.dispatch(&frame);
                    frames.push(frame);
                }
                Err(FrameError::Incomplete { needed }) => {
                    trace!("Incomplete frame, waiting for {} more bytes", needed);
                    break;
                }
                Err(err) => {
                    match &err {
                        FrameError::ChecksumMismatch { .. } => {
                            warn!("[COM] {} in {}", err, hex::encode(self.candidate()))
                        }
                        _ => debug!("[COM] {}", err),
                    }
                    // resync: give up only the marker that introduced the candidate
                    undecoded.extend_from_slice(&self.carry.split_to(MAGIC.len()));
                }
            }
        }

        if !undecoded.is_empty() {
            debug!("Undecoded {} bytes: {}", undecoded.len(), hex::encode(&undecoded));
        }

        DecodeResult {
            frames,
            undecoded: undecoded.freeze(),
        }
    }

    /// Validate and interpret the candidate at the front of the carry buffer,
    /// consuming it only on success.
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        let raw = RawFrame::parse(&self.carry, self.config.max_length)?;
        let frame = Frame::decode(&raw, self.last_battery)?;
        self.carry.advance(raw.wire_len());

        debug!("[{}] {}", frame.kind(), hex::encode(&raw.payload));
        if let Frame::Battery(level) = &frame {
            self.last_battery = level.percent;
        }
        Ok(frame)
    }

    fn dispatch(&mut self, frame: &Frame) {
        if let Some(observer) = self.observers.get_mut(&frame.kind()) {
            observer(frame);
        }
    }

    /// Bytes of the candidate at the front of the carry buffer, for logging
    fn candidate(&self) -> &[u8] {
        let len = self
            .carry
            .get(MAGIC.len())
            .map_or(self.carry.len(), |&length| HEADER_SIZE + usize::from(length) + CHECKSUM_SIZE);
        &self.carry[..len.min(self.carry.len())]
    }
}

fn find_magic(buf: &[u8]) -> Option<usize> {
    buf.windows(MAGIC.len()).position(|w| w == MAGIC)
}
