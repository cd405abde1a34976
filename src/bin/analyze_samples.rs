use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pulsecam::samples::read_samples;
use pulsecam::{MeasurementSession, PeakMethod, PpgConfig, PpgError, PpgResult, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "analyze_samples")]
#[command(about = "Analyze recorded camera PPG sample files", long_about = None)]
struct Args {
    /// Sample files to analyze (one value per line)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Pipeline configuration (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Peak detection method
    #[arg(short = 'm', long, value_enum)]
    method: Option<PeakMethod>,

    /// Frame rate of the recordings in Hz
    #[arg(short = 'r', long)]
    sampling_rate: Option<u32>,

    /// Run the pipeline every N frames
    #[arg(long, default_value = "15")]
    analyze_every: u32,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize, Default)]
struct FileAnalysis {
    filename: String,
    frames: usize,
    missing_roi_frames: usize,
    windows: usize,
    successes: usize,
    bpm: Option<StatsSummary>,
    confidence: Option<StatsSummary>,
    rmssd_ms: Option<StatsSummary>,
    /// Rejection reasons and how often each occurred
    rejections: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
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
        Some(ref path) => PpgConfig::from_toml_file(path)?,
        None => PpgConfig::default(),
    };
    if let Some(method) = args.method {
        config.method = method;
    }
    if let Some(rate) = args.sampling_rate {
        config.sampling_rate = rate;
    }
    config.validate()?;

    let session_config = SessionConfig {
        analyze_every_n_frames: args.analyze_every,
        ..SessionConfig::default()
    };
    session_config.validate()?;

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| analyze_file(path, &config, &session_config))
        .collect();

    match args.format {
        OutputFormat::Text => print_text(&results, &config),
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(())
}

fn analyze_file(path: &Path, config: &PpgConfig, session_config: &SessionConfig) -> FileAnalysis {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match analyze_file_impl(path, config, session_config) {
        Ok(mut analysis) => {
            analysis.filename = filename;
            analysis
        }
        Err(e) => FileAnalysis {
            filename,
            error: Some(e.to_string()),
            ..FileAnalysis::default()
        },
    }
}

fn analyze_file_impl(
    path: &Path,
    config: &PpgConfig,
    session_config: &SessionConfig,
) -> pulsecam::Result<FileAnalysis> {
    let frames = read_samples(path)?;
    let present = frames.iter().filter(|f| f.is_some()).count();
    if present < config.window_size() {
        return Err(PpgError::InsufficientData {
            needed: config.window_size(),
            available: present,
        });
    }

    let mut session = MeasurementSession::new(config, session_config.clone())?;
    let mut bpm_stats: Stats<f64> = Stats::new();
    let mut confidence_stats: Stats<f64> = Stats::new();
    let mut rmssd_stats: Stats<f64> = Stats::new();
    let mut analysis = FileAnalysis {
        frames: frames.len(),
        missing_roi_frames: frames.len() - present,
        ..FileAnalysis::default()
    };

    for &frame in &frames {
        let Some(result) = session.push_frame(frame) else {
            continue;
        };
        analysis.windows += 1;
        match result {
            PpgResult::Success(m) => {
                analysis.successes += 1;
                bpm_stats.update(m.bpm);
                confidence_stats.update(m.confidence);
                if m.hrv.is_valid() {
                    rmssd_stats.update(m.hrv.rmssd);
                }
            }
            PpgResult::Invalid { reason, .. } => {
                *analysis.rejections.entry(reason).or_default() += 1;
            }
            PpgResult::Error { message } => {
                log::warn!("{}: {}", path.display(), message);
                *analysis.rejections.entry(message).or_default() += 1;
            }
            PpgResult::Insufficient { .. } => {}
        }
    }

    analysis.bpm = StatsSummary::from_stats(&bpm_stats);
    analysis.confidence = StatsSummary::from_stats(&confidence_stats);
    analysis.rmssd_ms = StatsSummary::from_stats(&rmssd_stats);
    Ok(analysis)
}

fn print_text(results: &[FileAnalysis], config: &PpgConfig) {
    eprintln!(
        "Method: {} ({}), {} Hz, {} s window",
        config.method,
        config.method.band(),
        config.sampling_rate,
        config.window_seconds
    );
    eprintln!();

    println!(
        "{:<40} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "File", "BPM", "Std", "Conf", "RMSSD", "Windows", "Success"
    );
    println!("{}", "-".repeat(98));

    for result in results {
        if let Some(ref err) = result.error {
            println!("{:<40} ERROR: {}", result.filename, err);
            continue;
        }

        let fmt = |s: &Option<StatsSummary>, f: fn(&StatsSummary) -> f64| {
            s.as_ref()
                .map(|s| format!("{:.1}", f(s)))
                .unwrap_or_else(|| "-".to_string())
        };

        println!(
            "{:<40} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10}",
            result.filename,
            fmt(&result.bpm, |s| s.mean),
            fmt(&result.bpm, |s| s.std_dev),
            fmt(&result.confidence, |s| s.mean),
            fmt(&result.rmssd_ms, |s| s.mean),
            result.windows,
            result.successes
        );

        for (reason, count) in &result.rejections {
            println!("    {:>4}x {}", count, reason);
        }
    }
}

fn print_json(results: &[FileAnalysis]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}
