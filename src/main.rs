use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use pc60fw_lib::DecoderConfig;
use std::path::PathBuf;
use std::process;
use tokio::signal;
use tracing::{error, info};

mod decode;
mod logging;
mod monitor;
mod simulate;

/// Decode, monitor and simulate PC-60F pulse oximeter notification streams.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Optional path to a file to write logs to, in addition to stderr.
    #[arg(short, long, global = true)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a hex capture file through the decoder.
    Decode(decode::DecodeArgs),
    /// Decode hex notification lines arriving on stdin.
    Monitor(monitor::MonitorArgs),
    /// Print a synthetic notification stream as hex lines.
    Simulate(simulate::SimulateArgs),
}

/// Decoder settings shared by the decoding commands.
#[derive(Args, Debug, Clone)]
pub struct DecoderArgs {
    /// JSON file with decoder settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Largest Length byte accepted before a frame is considered corrupt (default 255).
    #[arg(long)]
    max_length: Option<u8>,
    /// Battery percent reported until the first battery frame.
    #[arg(long)]
    initial_battery: Option<u8>,
}

impl DecoderArgs {
    pub fn load(&self) -> Result<DecoderConfig> {
        let mut config = match &self.config {
            Some(path) => DecoderConfig::from_json_file(path)
                .with_context(|| format!("Failed to load decoder config from {:?}", path))?,
            None => DecoderConfig::default(),
        };
        if let Some(max_length) = self.max_length {
            config.max_length = max_length;
        }
        if let Some(initial_battery) = self.initial_battery {
            config.initial_battery = initial_battery;
        }
        config.validate().context("Invalid decoder settings")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_file, &cli.verbose)?;

    tokio::select! {
        res = run(cli.command) => {
            if let Err(e) = res {
                error!("Command failed: {:?}", e);
                process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Ctrl+C received, shutting down.");
        }
    }
    Ok(())
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Decode(args) => decode::run(args),
        Command::Monitor(args) => monitor::run(args).await,
        Command::Simulate(args) => simulate::run(args),
    }
}
