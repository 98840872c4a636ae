use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum MeasureMode {
    #[strum(to_string = "spot check")]
    SpotCheck = 1,
    #[strum(to_string = "continuous")]
    Continuous = 2,

    #[num_enum(catch_all)]
    #[strum(to_string = "unknown")]
    Unknown(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum MeasureFunction {
    #[strum(to_string = "continuous")]
    Continuous = 0,
    #[strum(to_string = "measuring")]
    Measuring = 2,
    #[strum(to_string = "data")]
    Data = 3,
    #[strum(to_string = "status")]
    Status = 4,
    #[strum(to_string = "end of cycle")]
    EndOfCycle = 5,

    #[num_enum(catch_all)]
    #[strum(to_string = "unknown")]
    Unknown(u8),
}

/// Mode payload as laid out on the wire (4 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ModeStatusRaw {
    pub mode: u8,
    pub func: u8,
    pub status: [u8; 2],
}

/// Operating mode and measurement-cycle report.
///
/// The meaning of `status` depends on `func`: zero in continuous mode,
/// remaining time or SpO2 while measuring, an error code for status
/// reports, and HR in the second byte of data reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStatus {
    pub mode: u8,
    pub func: u8,
    pub status: [u8; 2],
}

impl ModeStatus {
    pub fn measure_mode(&self) -> MeasureMode {
        MeasureMode::from_primitive(self.mode)
    }

    pub fn function(&self) -> MeasureFunction {
        MeasureFunction::from_primitive(self.func)
    }
}

impl From<ModeStatusRaw> for ModeStatus {
    fn from(raw: ModeStatusRaw) -> Self {
        Self {
            mode: raw.mode,
            func: raw.func,
            status: raw.status,
        }
    }
}

impl From<ModeStatus> for ModeStatusRaw {
    fn from(status: ModeStatus) -> Self {
        Self {
            mode: status.mode,
            func: status.func,
            status: status.status,
        }
    }
}

impl fmt::Display for ModeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mode: {} ({}), Function: {} ({}), Status: [{}, {}]",
            self.measure_mode(),
            self.mode,
            self.function(),
            self.func,
            self.status[0],
            self.status[1]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_accessors() {
        let status = ModeStatus {
            mode: 1,
            func: 5,
            status: [0, 0],
        };
        assert_eq!(status.measure_mode(), MeasureMode::SpotCheck);
        assert_eq!(status.function(), MeasureFunction::EndOfCycle);

        let odd = ModeStatus {
            mode: 9,
            func: 1,
            status: [0, 0],
        };
        assert_eq!(odd.measure_mode(), MeasureMode::Unknown(9));
        assert_eq!(odd.function(), MeasureFunction::Unknown(1));
    }

    #[test]
    fn test_display() {
        let status = ModeStatus {
            mode: 2,
            func: 0,
            status: [0, 0],
        };
        assert_eq!(
            status.to_string(),
            "Mode: continuous (2), Function: continuous (0), Status: [0, 0]"
        );
    }

    #[test]
    fn test_raw_layout() {
        let raw = ModeStatusRaw::read_from_bytes(&[1, 2, 30, 0][..]).unwrap();
        let status = ModeStatus::from(raw);
        assert_eq!(status.status, [30, 0]);
        assert_eq!(ModeStatusRaw::from(status).as_bytes(), &[1, 2, 30, 0]);
    }
}
