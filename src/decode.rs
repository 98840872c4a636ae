use crate::DecoderArgs;
use anyhow::{Context, Result};
use clap::Args;
use pc60fw_lib::capture::read_capture;
use pc60fw_lib::{Decoder, Frame, FrameKind};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file: one notification per line as hex bytes.
    file: PathBuf,
    /// Print frames as JSON lines.
    #[arg(long)]
    json: bool,
    /// Also print battery and unrecognized frames.
    #[arg(short, long)]
    all: bool,
    #[command(flatten)]
    decoder: DecoderArgs,
}

pub fn run(args: DecodeArgs) -> Result<()> {
    let config = args.decoder.load()?;
    let records = read_capture(&args.file).with_context(|| format!("Failed to read capture {:?}", args.file))?;
    info!("Replaying {} notifications from {:?}", records.len(), args.file);

    let mut decoder = Decoder::with_config(config);
    let mut kinds = vec![FrameKind::Wave, FrameKind::VitalData, FrameKind::Mode];
    if args.all {
        kinds.extend([FrameKind::Battery, FrameKind::Unknown]);
    }
    for kind in kinds {
        let json = args.json;
        decoder.register(kind, move |frame| print_frame(frame, json));
    }

    let mut frames = 0usize;
    let mut undecoded = 0usize;
    for (i, record) in records.iter().enumerate() {
        let result = decoder.feed(&record.chunk);
        frames += result.frames.len();
        if !result.undecoded.is_empty() {
            warn!(
                notification = i + 1,
                "{} undecoded bytes: {}",
                result.undecoded.len(),
                hex::encode(&result.undecoded)
            );
            undecoded += result.undecoded.len();
        }
    }

    info!(
        frames,
        undecoded,
        carried = decoder.buffered_len(),
        battery = decoder.last_battery(),
        "Replay finished"
    );
    Ok(())
}

pub fn print_frame(frame: &Frame, json: bool) {
    if json {
        match serde_json::to_string(frame) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize frame: {}", e),
        }
    } else {
        println!("{}", frame);
    }
}
