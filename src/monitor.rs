use crate::DecoderArgs;
use crate::decode::print_frame;
use anyhow::{Context, Result};
use clap::Args;
use pc60fw_lib::analysis::PulseTracker;
use pc60fw_lib::capture::parse_line;
use pc60fw_lib::{Decoder, Frame, stream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Print frames as JSON lines.
    #[arg(long)]
    json: bool,
    /// Hide waveform frames and print only the pulse rate derived from them.
    #[arg(long)]
    no_wave: bool,
    /// Number of notifications that may queue up ahead of the decoder.
    #[arg(long, default_value_t = 64)]
    queue: usize,
    #[command(flatten)]
    decoder: DecoderArgs,
}

pub async fn run(args: MonitorArgs) -> Result<()> {
    let config = args.decoder.load()?;
    let (sender, mut pump) = stream::spawn(Decoder::with_config(config), args.queue);

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut line_no = 0usize;
        while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
            line_no += 1;
            match parse_line(&line, line_no) {
                Ok(Some(record)) => sender.send(record.chunk).await?,
                Ok(None) => {}
                Err(e) => warn!("Skipping line: {}", e),
            }
        }
        debug!("stdin closed after {} lines", line_no);
        Ok::<_, anyhow::Error>(())
    });

    let mut tracker = PulseTracker::new();
    while let Some(result) = pump.recv().await {
        for frame in &result.frames {
            if let Frame::Wave(wave) = frame {
                for bpm in tracker.extend(wave) {
                    info!("Pulse from waveform: {:.0} bpm", bpm);
                }
                if args.no_wave {
                    continue;
                }
            }
            print_frame(frame, args.json);
        }
        if !result.undecoded.is_empty() {
            warn!("{} undecoded bytes: {}", result.undecoded.len(), hex::encode(&result.undecoded));
        }
    }

    reader.await??;
    let decoder = pump.finish().await?;
    info!(
        carried = decoder.buffered_len(),
        battery = decoder.last_battery(),
        "Monitor finished"
    );
    Ok(())
}
