use crate::constants::{BATTERY_RAW_MAX, DEFAULT_BATTERY_PERCENT};
use serde::{Deserialize, Serialize};
use std::fmt;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Vital data payload as laid out on the wire (4 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct VitalDataRaw {
    pub spo2: u8,
    pub hr: u8,
    /// Unused by the device
    pub reserved: u8,
    /// Perfusion index x10
    pub pi_raw: u8,
}

/// SpO2 / pulse / perfusion measurement.
///
/// The frame itself carries no battery field; `battery` is the last level the
/// decoder saw on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalData {
    /// Percent
    pub spo2: u8,
    /// Beats per minute
    pub hr: u8,
    /// Perfusion index, percent
    pub pi: f64,
    /// Percent
    pub battery: u8,
}

impl VitalData {
    pub fn from_raw(raw: VitalDataRaw, battery: u8) -> Self {
        Self {
            spo2: raw.spo2,
            hr: raw.hr,
            pi: f64::from(raw.pi_raw) / 10.0,
            battery,
        }
    }
}

impl From<VitalData> for VitalDataRaw {
    fn from(data: VitalData) -> Self {
        VitalDataRaw {
            spo2: data.spo2,
            hr: data.hr,
            reserved: 0,
            pi_raw: (data.pi * 10.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

impl Default for VitalData {
    fn default() -> Self {
        Self {
            spo2: 0,
            hr: 0,
            pi: 0.0,
            battery: DEFAULT_BATTERY_PERCENT,
        }
    }
}

impl fmt::Display for VitalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpO2: {} %, HR: {} bpm, PI: {:.1} %, Battery: {} %",
            self.spo2, self.hr, self.pi, self.battery
        )
    }
}

/// Battery report. The device sends a coarse 0..=3 level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryLevel {
    pub raw: u8,
    pub percent: u8,
}

impl BatteryLevel {
    /// Scale with floor division: 0 -> 0, 1 -> 33, 2 -> 66, 3 -> 100.
    /// Levels above 3 clamp to 100.
    pub fn from_raw(raw: u8) -> Self {
        let percent = (u16::from(raw) * 100 / u16::from(BATTERY_RAW_MAX)).min(100) as u8;
        Self { raw, percent }
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Battery: {} % (level {})", self.percent, self.raw)
    }
}
