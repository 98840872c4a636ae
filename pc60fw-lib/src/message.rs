use crate::constants::{BATTERY_PAYLOAD_SIZE, MODE_PAYLOAD_SIZE, VITAL_PAYLOAD_SIZE};
use crate::error::{DecoderError, FrameError};
use crate::frame::{FrameType, RawFrame, encode_frame};
use crate::mode::{ModeStatus, ModeStatusRaw};
use crate::vital::{BatteryLevel, VitalData, VitalDataRaw};
use crate::wave::Waveform;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;
use zerocopy::{FromBytes, IntoBytes};

/// Checksum-valid frame whose type byte is not one we interpret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownFrame {
    pub frame_type: u8,
    pub payload: Bytes,
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    Wave(Waveform),
    VitalData(VitalData),
    Battery(BatteryLevel),
    Mode(ModeStatus),
    Unknown(UnknownFrame),
}

/// Observer routing key, one per [`Frame`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    #[strum(to_string = "WAVE")]
    Wave,
    #[strum(to_string = "DATA")]
    VitalData,
    #[strum(to_string = "BAT")]
    Battery,
    #[strum(to_string = "MODE")]
    Mode,
    #[strum(to_string = "UNKNOWN")]
    Unknown,
}

impl Frame {
    /// Interpret a verified frame. `battery` is attached to vital data.
    pub fn decode(raw: &RawFrame, battery: u8) -> Result<Self, FrameError> {
        let payload = raw.payload.as_ref();
        match raw.frame_type {
            FrameType::Waveform => Ok(Frame::Wave(Waveform::new(raw.payload.clone()))),
            FrameType::VitalData => {
                let (vital, _) = VitalDataRaw::read_from_prefix(payload)
                    .map_err(|_| too_short(raw.frame_type, VITAL_PAYLOAD_SIZE, payload.len()))?;
                Ok(Frame::VitalData(VitalData::from_raw(vital, battery)))
            }
            FrameType::Battery => {
                let level = *payload
                    .first()
                    .ok_or_else(|| too_short(raw.frame_type, BATTERY_PAYLOAD_SIZE, payload.len()))?;
                Ok(Frame::Battery(BatteryLevel::from_raw(level)))
            }
            FrameType::ModeStatus => {
                let (mode, _) = ModeStatusRaw::read_from_prefix(payload)
                    .map_err(|_| too_short(raw.frame_type, MODE_PAYLOAD_SIZE, payload.len()))?;
                Ok(Frame::Mode(ModeStatus::from(mode)))
            }
            FrameType::Unknown(frame_type) => Ok(Frame::Unknown(UnknownFrame {
                frame_type,
                payload: raw.payload.clone(),
            })),
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Wave(_) => FrameKind::Wave,
            Frame::VitalData(_) => FrameKind::VitalData,
            Frame::Battery(_) => FrameKind::Battery,
            Frame::Mode(_) => FrameKind::Mode,
            Frame::Unknown(_) => FrameKind::Unknown,
        }
    }

    pub fn frame_type(&self) -> FrameType {
        match self {
            Frame::Wave(_) => FrameType::Waveform,
            Frame::VitalData(_) => FrameType::VitalData,
            Frame::Battery(_) => FrameType::Battery,
            Frame::Mode(_) => FrameType::ModeStatus,
            Frame::Unknown(unknown) => FrameType::from(unknown.frame_type),
        }
    }

    /// Payload bytes, i.e. the frame without marker, length, type and checksum
    pub fn payload(&self) -> Bytes {
        match self {
            Frame::Wave(wave) => wave.samples.clone(),
            Frame::VitalData(data) => Bytes::copy_from_slice(VitalDataRaw::from(*data).as_bytes()),
            Frame::Battery(level) => Bytes::copy_from_slice(&[level.raw]),
            Frame::Mode(status) => Bytes::copy_from_slice(ModeStatusRaw::from(*status).as_bytes()),
            Frame::Unknown(unknown) => unknown.payload.clone(),
        }
    }

    /// Wire representation of this frame
    pub fn to_bytes(&self) -> Result<Bytes, DecoderError> {
        encode_frame(self.frame_type().into(), &self.payload())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Wave(wave) => {
                write!(f, "[{}] ", self.kind())?;
                for (i, sample) in wave.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}{}", sample.value, if sample.peak { "*" } else { "" })?;
                }
                Ok(())
            }
            Frame::VitalData(data) => write!(f, "[{}] {}", self.kind(), data),
            Frame::Battery(level) => write!(f, "[{}] {}", self.kind(), level),
            Frame::Mode(status) => write!(f, "[{}] {}", self.kind(), status),
            Frame::Unknown(unknown) => write!(
                f,
                "[{}] type {}: {}",
                self.kind(),
                unknown.frame_type,
                hex::encode(&unknown.payload)
            ),
        }
    }
}

fn too_short(frame_type: FrameType, expected: usize, actual: usize) -> FrameError {
    FrameError::PayloadTooShort {
        frame_type: frame_type.into(),
        expected,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(frame_type: u8, payload: &'static [u8]) -> RawFrame {
        RawFrame::new(FrameType::from(frame_type), Bytes::from_static(payload))
    }

    #[test]
    fn test_decode_each_type() {
        let vital = Frame::decode(&raw(1, &[0x62, 0x4B, 0x00, 0x32]), 100).unwrap();
        assert_eq!(
            vital,
            Frame::VitalData(VitalData {
                spo2: 98,
                hr: 75,
                pi: 5.0,
                battery: 100
            })
        );

        let wave = Frame::decode(&raw(2, &[0x40, 0xC8]), 100).unwrap();
        assert_eq!(wave.kind(), FrameKind::Wave);

        let battery = Frame::decode(&raw(3, &[0x02]), 100).unwrap();
        assert_eq!(battery, Frame::Battery(BatteryLevel { raw: 2, percent: 66 }));

        let mode = Frame::decode(&raw(33, &[0x02, 0x00, 0x00, 0x00]), 100).unwrap();
        assert_eq!(
            mode,
            Frame::Mode(ModeStatus {
                mode: 2,
                func: 0,
                status: [0, 0]
            })
        );

        let unknown = Frame::decode(&raw(0x0F, &[0x01]), 100).unwrap();
        assert_eq!(unknown.kind(), FrameKind::Unknown);
        assert_eq!(unknown.frame_type(), FrameType::Unknown(0x0F));
    }

    #[test]
    fn test_decode_extra_payload_is_ignored() {
        let vital = Frame::decode(&raw(1, &[0x62, 0x4B, 0x00, 0x32, 0x07]), 33).unwrap();
        assert!(matches!(vital, Frame::VitalData(VitalData { spo2: 98, battery: 33, .. })));
    }

    #[test]
    fn test_decode_short_payload() {
        assert_eq!(
            Frame::decode(&raw(1, &[0x62, 0x4B]), 100),
            Err(FrameError::PayloadTooShort {
                frame_type: 1,
                expected: 4,
                actual: 2
            })
        );
        assert!(Frame::decode(&raw(3, &[]), 100).is_err());
        assert!(Frame::decode(&raw(33, &[1, 2, 3]), 100).is_err());
    }

    #[test]
    fn test_to_bytes_matches_wire() {
        let frame = Frame::VitalData(VitalData {
            spo2: 98,
            hr: 75,
            pi: 5.0,
            battery: 100,
        });
        assert_eq!(
            frame.to_bytes().unwrap().as_ref(),
            &[0xAA, 0x55, 0x05, 0x01, 0x62, 0x4B, 0x00, 0x32, 0x20]
        );
        let battery = Frame::Battery(BatteryLevel::from_raw(2));
        assert_eq!(battery.to_bytes().unwrap().as_ref(), &[0xAA, 0x55, 0x02, 0x03, 0x02, 0x71]);
    }

    #[test]
    fn test_display() {
        let wave = Frame::Wave(Waveform::new(Bytes::from_static(&[0x40, 0xC8])));
        assert_eq!(wave.to_string(), "[WAVE] 0 8*");
        let unknown = Frame::Unknown(UnknownFrame {
            frame_type: 9,
            payload: Bytes::from_static(&[0xde, 0xad]),
        });
        assert_eq!(unknown.to_string(), "[UNKNOWN] type 9: dead");
    }

    #[test]
    fn test_json_is_tagged() {
        let frame = Frame::Battery(BatteryLevel::from_raw(3));
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"kind":"battery","raw":3,"percent":100}"#);
    }
}
