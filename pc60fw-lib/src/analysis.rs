//! Waveform post-processing for display.
//!
//! Not part of decoding: consumers feed decoded [`Waveform`]s in and get a
//! sweep-style display buffer and a pulse rate derived from the device's
//! peak flags.

use crate::constants::WAVE_SAMPLE_RATE_HZ;
use crate::wave::{WaveSample, Waveform};
use std::collections::VecDeque;

/// Samples kept for display, ten seconds at 50 Hz
pub const DISPLAY_WINDOW: usize = 500;

/// Most recent pulse rates kept; older ones are dropped
pub const RATE_HISTORY: usize = 64;

/// Rolling plethysmograph buffer with peak-to-peak pulse rate
#[derive(Debug, Clone)]
pub struct PulseTracker {
    window: Vec<i8>,
    cursor: usize,
    since_peak: Option<u32>,
    rates: VecDeque<f64>,
}

impl Default for PulseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseTracker {
    pub fn new() -> Self {
        Self::with_window(DISPLAY_WINDOW)
    }

    pub fn with_window(len: usize) -> Self {
        Self {
            window: vec![0; len.max(1)],
            cursor: 0,
            since_peak: None,
            rates: VecDeque::with_capacity(RATE_HISTORY),
        }
    }

    /// Add one sample; returns the pulse rate (bpm) when it completes a
    /// peak-to-peak interval.
    pub fn push(&mut self, sample: WaveSample) -> Option<f64> {
        self.cursor = (self.cursor + 1) % self.window.len();
        self.window[self.cursor] = sample.value;

        if let Some(count) = self.since_peak.as_mut() {
            *count += 1;
        }

        if !sample.peak {
            return None;
        }

        // the first peak only starts the interval
        let rate = self
            .since_peak
            .map(|n| 60.0 / (f64::from(n) / WAVE_SAMPLE_RATE_HZ));
        self.since_peak = Some(0);
        if let Some(bpm) = rate {
            if self.rates.len() == RATE_HISTORY {
                self.rates.pop_front();
            }
            self.rates.push_back(bpm);
        }
        rate
    }

    /// Add every sample of a frame; returns the rates completed by it
    pub fn extend(&mut self, wave: &Waveform) -> Vec<f64> {
        wave.iter().filter_map(|sample| self.push(sample)).collect()
    }

    /// Display buffer in sweep order: the newest sample overwrites the oldest
    /// in place.
    pub fn display(&self) -> &[i8] {
        &self.window
    }

    /// Display position of the newest sample
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Up to [`RATE_HISTORY`] recent rates, oldest first
    pub fn rates(&self) -> impl Iterator<Item = f64> + '_ {
        self.rates.iter().copied()
    }

    pub fn last_rate(&self) -> Option<f64> {
        self.rates.back().copied()
    }
}
