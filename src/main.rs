use anyhow::Context;
use clap::Parser;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;

use pulsecam::output::{OutputFormat, create_formatter};
use pulsecam::samples::parse_sample_line;
use pulsecam::{MeasurementSession, PeakMethod, PpgConfig, PpgResult, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "pulsecam")]
#[command(about = "Heart rate and HRV from a camera brightness stream on stdin", long_about = None)]
struct Args {
    /// Pipeline configuration (TOML); flags below override it
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Peak detection method
    #[arg(short = 'm', long, value_enum)]
    method: Option<PeakMethod>,

    /// Frame rate of the incoming stream in Hz
    #[arg(short = 'r', long)]
    sampling_rate: Option<u32>,

    /// Analysis window in seconds
    #[arg(short = 'w', long)]
    window: Option<u32>,

    /// Run the pipeline every N frames
    #[arg(long, default_value = "15")]
    analyze_every: u32,

    /// Frames without an ROI before the measurement restarts
    #[arg(long, default_value = "15")]
    roi_lost_threshold: u32,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also print progress while the buffer fills
    #[arg(long)]
    progress: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => PpgConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PpgConfig::default(),
    };
    if let Some(method) = args.method {
        config.method = method;
    }
    if let Some(rate) = args.sampling_rate {
        config.sampling_rate = rate;
    }
    if let Some(window) = args.window {
        config.window_seconds = window;
    }

    let session_config = SessionConfig {
        analyze_every_n_frames: args.analyze_every,
        roi_lost_threshold: args.roi_lost_threshold,
    };

    log::info!(
        "{} Hz, {} s window, method {}, band {}",
        config.sampling_rate,
        config.window_seconds,
        config.method,
        config.method.band()
    );

    let session =
        MeasurementSession::new(&config, session_config).context("Invalid configuration")?;

    let (frame_tx, frame_rx) = bounded(config.sampling_rate as usize);
    let reader = thread::spawn(move || read_stdin(frame_tx));

    run_processing_loop(frame_rx, session, &args)?;

    reader
        .join()
        .map_err(|_| anyhow::anyhow!("stdin reader thread panicked"))??;

    Ok(())
}

fn read_stdin(frame_tx: Sender<Option<f64>>) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.context("Failed to read stdin")?;
        match parse_sample_line(&line) {
            Ok(Some(frame)) => {
                if frame_tx.send(frame).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("line {}: {}", line_no + 1, e),
        }
    }
    Ok(())
}

fn run_processing_loop(
    frame_rx: Receiver<Option<f64>>,
    mut session: MeasurementSession,
    args: &Args,
) -> anyhow::Result<()> {
    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let analyze_every = args.analyze_every.max(1) as u64;
    let mut roi_was_present = true;

    for frame in frame_rx.iter() {
        let result = session.push_frame(frame);

        if roi_was_present != session.roi_present() {
            log::info!(
                "ROI {}",
                if session.roi_present() { "found" } else { "lost" }
            );
            roi_was_present = session.roi_present();
        }

        match result {
            Some(result) => println!("{}", formatter.format(&result)),
            None if args.progress
                && frame.is_some()
                && !session.processor().is_ready()
                && session.frame_count() % analyze_every == 0 =>
            {
                let processor = session.processor();
                let progress = PpgResult::Insufficient {
                    progress: processor.buffered_samples(),
                    required: processor.config().window_size(),
                };
                println!("{}", formatter.format(&progress));
            }
            None => {}
        }
    }

    log::debug!("Input stream closed after {} frames", session.frame_count());
    Ok(())
}
