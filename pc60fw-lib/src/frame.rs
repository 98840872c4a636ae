use crate::constants::{CHECKSUM_SIZE, HEADER_SIZE, MAGIC, MIN_FRAME_SIZE};
use crate::crc::crc8_maxim;
use crate::error::{DecoderError, FrameError};
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};

/// Frame kind discriminator carried in the Type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum FrameType {
    VitalData = 1,
    Waveform = 2,
    Battery = 3,
    ModeStatus = 33,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// A framed, checksum-verified unit that has not been interpreted yet.
///
/// ```text
/// +------+------+--------+------+-----------------+-----+
/// | 0xAA | 0x55 | length | type | payload[len-1]  | crc |
/// +------+------+--------+------+-----------------+-----+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub frame_type: FrameType,
    pub payload: Bytes,
}

impl RawFrame {
    pub fn new(frame_type: FrameType, payload: Bytes) -> Self {
        Self { frame_type, payload }
    }

    /// Value of the Length byte: type plus payload.
    pub fn length(&self) -> usize {
        1 + self.payload.len()
    }

    /// Number of bytes this frame occupies on the wire.
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE + self.length() + CHECKSUM_SIZE
    }

    /// Validate one frame at the start of `buf`.
    ///
    /// `buf` must start with the marker. Bytes past the frame are ignored, so
    /// the caller advances by [`RawFrame::wire_len`] on success.
    pub fn parse(buf: &[u8], max_length: u8) -> Result<Self, FrameError> {
        if buf.len() < MIN_FRAME_SIZE {
            return Err(FrameError::Incomplete {
                needed: MIN_FRAME_SIZE - buf.len(),
            });
        }
        if buf[..MAGIC.len()] != MAGIC {
            return Err(FrameError::InvalidMagic);
        }

        let length = buf[MAGIC.len()];
        if length == 0 || length > max_length {
            return Err(FrameError::LengthOutOfRange { length, max: max_length });
        }

        let total = HEADER_SIZE + usize::from(length) + CHECKSUM_SIZE;
        if buf.len() < total {
            return Err(FrameError::Incomplete {
                needed: total - buf.len(),
            });
        }

        let expected = buf[total - 1];
        let computed = crc8_maxim(&buf[..total - 1]);
        if expected != computed {
            return Err(FrameError::ChecksumMismatch { expected, computed });
        }

        Ok(Self {
            frame_type: FrameType::from_primitive(buf[HEADER_SIZE]),
            payload: Bytes::copy_from_slice(&buf[MIN_FRAME_SIZE..total - 1]),
        })
    }

    /// Serialize with marker, length and checksum.
    pub fn encode(&self) -> Result<Bytes, DecoderError> {
        encode_frame(self.frame_type.into(), &self.payload)
    }
}

/// Build a wire-exact frame for `frame_type` around `payload`.
pub fn encode_frame(frame_type: u8, payload: &[u8]) -> Result<Bytes, DecoderError> {
    let length = u8::try_from(payload.len() + 1).map_err(|_| DecoderError::PayloadTooLong(payload.len()))?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + usize::from(length) + CHECKSUM_SIZE);
    buf.extend_from_slice(&MAGIC);
    buf.put_u8(length);
    buf.put_u8(frame_type);
    buf.extend_from_slice(payload);
    let checksum = crc8_maxim(&buf);
    buf.put_u8(checksum);
    Ok(buf.freeze())
}
