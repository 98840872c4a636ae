use crate::constants::{WAVE_SAMPLE_OFFSET, WAVE_SAMPLE_RATE_HZ};
use bytes::Bytes;
use modular_bitfield::prelude::*;
use serde::{Deserialize, Serialize};

/// One plethysmograph byte as it appears on the wire.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveByte {
    pub magnitude: B7,
    pub peak: bool,
}

/// Decoded waveform sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSample {
    /// Amplitude centred on zero (-64..=63)
    pub value: i8,
    /// Set on the sample where the device detected a pulse maximum
    pub peak: bool,
}

impl From<u8> for WaveSample {
    fn from(byte: u8) -> Self {
        let bits = WaveByte::from_bytes([byte]);
        // magnitude is 7 bits, so the cast cannot wrap
        let value = bits.magnitude() as i8 - WAVE_SAMPLE_OFFSET;
        Self {
            value,
            peak: bits.peak(),
        }
    }
}

impl From<WaveSample> for u8 {
    fn from(sample: WaveSample) -> Self {
        let magnitude = (i16::from(sample.value) + i16::from(WAVE_SAMPLE_OFFSET)).clamp(0, 0x7F) as u8;
        WaveByte::new()
            .with_magnitude(magnitude)
            .with_peak(sample.peak)
            .into_bytes()[0]
    }
}

/// Waveform frame: the raw sample bytes exactly as received.
///
/// Samples are delivered at [`WAVE_SAMPLE_RATE_HZ`]; the device typically
/// batches five per frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waveform {
    pub samples: Bytes,
}

impl Waveform {
    pub fn new(samples: Bytes) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate decoded samples in arrival order
    pub fn iter(&self) -> impl Iterator<Item = WaveSample> + '_ {
        self.samples.iter().copied().map(WaveSample::from)
    }

    /// Number of samples carrying the peak flag
    pub fn peak_count(&self) -> usize {
        self.iter().filter(|s| s.peak).count()
    }

    /// Time span covered by this frame in seconds
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / WAVE_SAMPLE_RATE_HZ
    }
}

impl FromIterator<WaveSample> for Waveform {
    fn from_iter<T: IntoIterator<Item = WaveSample>>(iter: T) -> Self {
        let bytes: Vec<u8> = iter.into_iter().map(u8::from).collect();
        Self::new(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_bit_layout() {
        assert_eq!(WaveSample::from(0x40), WaveSample { value: 0, peak: false });
        assert_eq!(WaveSample::from(0x00), WaveSample { value: -64, peak: false });
        assert_eq!(WaveSample::from(0x7F), WaveSample { value: 63, peak: false });
        assert_eq!(WaveSample::from(0xC8), WaveSample { value: 8, peak: true });
        assert_eq!(WaveSample::from(0x80), WaveSample { value: -64, peak: true });
    }

    #[test]
    fn test_sample_to_byte() {
        assert_eq!(u8::from(WaveSample { value: 8, peak: true }), 0xC8);
        assert_eq!(u8::from(WaveSample { value: -10, peak: false }), 0x36);
    }

    #[test]
    fn test_waveform_iteration() {
        let wave = Waveform::new(Bytes::from_static(&[0x40, 0x45, 0xC8, 0x3A, 0x30]));
        let values: Vec<i8> = wave.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0, 5, 8, -6, -16]);
        assert_eq!(wave.peak_count(), 1);
        assert_eq!(wave.len(), 5);
        assert!((wave.duration_s() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_waveform_from_samples() {
        let wave: Waveform = [WaveSample { value: 1, peak: false }, WaveSample { value: 2, peak: true }]
            .into_iter()
            .collect();
        assert_eq!(wave.samples.as_ref(), &[0x41, 0xC2]);
    }
}
