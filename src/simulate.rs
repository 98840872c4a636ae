use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Args;
use pc60fw_lib::capture::{CaptureRecord, write_capture};
use pc60fw_lib::constants::WAVE_SAMPLE_RATE_HZ;
use pc60fw_lib::{BatteryLevel, Frame, ModeStatus, VitalData, WaveSample, Waveform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::path::PathBuf;
use tracing::{debug, info};

/// Samples per waveform notification, as the device sends them
const SAMPLES_PER_WAVE: usize = 5;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Length of the session in seconds.
    #[arg(short, long, default_value_t = 10)]
    seconds: u32,
    /// Simulated heart rate in bpm.
    #[arg(long, default_value_t = 72)]
    hr: u8,
    /// Simulated SpO2 in percent.
    #[arg(long, default_value_t = 98)]
    spo2: u8,
    /// Raw battery level reported every ten seconds (0-3).
    #[arg(long, default_value_t = 2)]
    battery: u8,
    /// Re-split the stream into random chunks of at most this many bytes.
    #[arg(long)]
    max_chunk: Option<usize>,
    /// Probability of flipping one bit in each frame.
    #[arg(long, default_value_t = 0.0)]
    corrupt: f64,
    /// RNG seed for chunking and corruption.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the capture to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.corrupt),
        "corrupt must be a probability, got {}",
        args.corrupt
    );
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut records = Vec::new();
    let mut corrupted = 0usize;
    for (timestamp, frame) in session(&args) {
        let mut bytes = frame.to_bytes()?.to_vec();
        if rng.gen_bool(args.corrupt) {
            let bit = rng.gen_range(0..bytes.len() * 8);
            bytes[bit / 8] ^= 1 << (bit % 8);
            corrupted += 1;
            debug!("Corrupted {} at {:.2}s, bit {}", frame.kind(), timestamp, bit);
        }
        records.push(CaptureRecord::new(Some(timestamp), Bytes::from(bytes)));
    }

    if let Some(max_chunk) = args.max_chunk {
        records = rechunk(&records, max_chunk.max(1), &mut rng);
    }
    info!("Generated {} notifications, {} frames corrupted", records.len(), corrupted);

    match &args.output {
        Some(path) => write_capture(path, &records).with_context(|| format!("Failed to write {:?}", path))?,
        None => {
            for record in &records {
                println!("{}", record);
            }
        }
    }
    Ok(())
}

/// Frames in the order a continuous-mode session sends them
fn session(args: &SimulateArgs) -> Vec<(f64, Frame)> {
    let ticks = args.seconds as usize * 10;
    let beats_per_sample = f64::from(args.hr) / 60.0 / WAVE_SAMPLE_RATE_HZ;
    let mut phase = 0.0f64;
    let mut frames = Vec::new();

    for tick in 0..ticks {
        let timestamp = tick as f64 / 10.0;
        if tick % 100 == 0 {
            frames.push((timestamp, Frame::Battery(BatteryLevel::from_raw(args.battery))));
        }
        if tick % 50 == 0 {
            frames.push((
                timestamp,
                Frame::Mode(ModeStatus {
                    mode: 2,
                    func: 0,
                    status: [0, 0],
                }),
            ));
        }

        let wave: Waveform = (0..SAMPLES_PER_WAVE)
            .map(|_| {
                let next = phase + beats_per_sample;
                // peak flag where the curve passes its maximum at a quarter beat
                let peak = (next - 0.25).floor() != (phase - 0.25).floor();
                phase = next;
                WaveSample {
                    value: (40.0 * (TAU * phase).sin()).round() as i8,
                    peak,
                }
            })
            .collect();
        frames.push((timestamp, Frame::Wave(wave)));

        if tick % 10 == 9 {
            frames.push((
                timestamp,
                Frame::VitalData(VitalData {
                    spo2: args.spo2,
                    hr: args.hr,
                    pi: 2.4,
                    battery: BatteryLevel::from_raw(args.battery).percent,
                }),
            ));
        }
    }
    frames
}

/// Concatenate and re-split, the way a BLE stack may fragment notifications
fn rechunk(records: &[CaptureRecord], max_chunk: usize, rng: &mut StdRng) -> Vec<CaptureRecord> {
    let stream: Vec<u8> = records.iter().flat_map(|r| r.chunk.iter().copied()).collect();
    let mut chunks = Vec::new();
    let mut rest = stream.as_slice();
    while !rest.is_empty() {
        let len = rng.gen_range(1..=max_chunk.min(rest.len()));
        let (chunk, tail) = rest.split_at(len);
        chunks.push(CaptureRecord::new(None, Bytes::copy_from_slice(chunk)));
        rest = tail;
    }
    chunks
}
