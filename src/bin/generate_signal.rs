use anyhow::{Context, Result};
use clap::Parser;
use pulsecam::samples::save_samples;
use pulsecam::simulation::{
    AdditiveNoiseConfig, MotionArtifactConfig, NoiseConfig, apply_noise, generate_ppg_signal,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_signal")]
#[command(about = "Generate synthetic camera PPG sample files with configurable noise")]
struct Args {
    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Heart rates: comma-separated (e.g., "60,72,90") or range (e.g., "50-120:10")
    #[arg(short, long, default_value = "50-120:10")]
    rates: String,

    /// Number of trials per heart rate
    #[arg(short, long, default_value_t = 5)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 20.0)]
    duration: f64,

    /// Frame rate in Hz
    #[arg(long, default_value_t = 30)]
    sampling_rate: u32,

    /// Mean ROI intensity
    #[arg(long, default_value_t = 120.0)]
    baseline: f64,

    /// Pulsatile amplitude
    #[arg(long, default_value_t = 4.0)]
    amplitude: f64,

    /// Output filename prefix
    #[arg(long, default_value = "synth")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f64>,

    /// Motion artifact rate in Hz (CLI override)
    #[arg(long)]
    motion_rate: Option<f64>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    bpm: f64,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sampling_rate: u32,
    duration: f64,
    baseline: f64,
    amplitude: f64,
    files: Vec<ManifestEntry>,
}

/// Parse "60,72,90" or an inclusive "start-end:step" range
fn parse_rates(s: &str) -> Result<Vec<f64>> {
    let Some((range, step)) = s.split_once(':') else {
        return s
            .split(',')
            .map(|p| p.trim().parse::<f64>().context("Invalid heart rate value"))
            .collect();
    };

    let step: f64 = step.trim().parse().context("Invalid step value")?;
    if step <= 0.0 {
        anyhow::bail!("Step must be positive");
    }
    let (start, end) = range
        .split_once('-')
        .context("Invalid range format. Use 'start-end:step'")?;
    let start: f64 = start.trim().parse().context("Invalid start value")?;
    let end: f64 = end.trim().parse().context("Invalid end value")?;

    let count = ((end - start) / step).floor() as i64 + 1;
    Ok((0..count.max(0)).map(|k| start + k as f64 * step).collect())
}

fn load_toml_config(path: &PathBuf) -> Result<NoiseConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(base: &NoiseConfig, args: &Args, seed: u64) -> NoiseConfig {
    let mut config = base.clone().with_seed(seed);

    if let Some(snr) = args.snr {
        config.additive = Some(AdditiveNoiseConfig { snr_db: snr });
    }
    if let Some(rate) = args.motion_rate {
        config.motion = Some(MotionArtifactConfig {
            rate_hz: rate,
            amplitude: 10.0,
            duration_samples: 3,
        });
    }

    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        NoiseConfig::default()
    };

    let rates = parse_rates(&args.rates)?;
    let base_seed = args.seed.unwrap_or(0);

    let mut manifest_entries = Vec::new();
    let total_files = rates.len() * args.trials as usize;
    let mut file_count = 0;

    for &bpm in &rates {
        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + bpm as u64;
            let noise_config = build_noise_config(&toml_config, &args, seed);

            let clean = generate_ppg_signal(
                args.duration,
                args.sampling_rate,
                bpm,
                args.baseline,
                args.amplitude,
            );
            let noisy = apply_noise(&clean, &noise_config, args.sampling_rate as f64);
            let frames: Vec<Option<f64>> = noisy.into_iter().map(Some).collect();

            let filename = format!("{}_bpm{:03}_t{:02}.txt", args.prefix, bpm as i32, trial);
            let filepath = args.output_dir.join(&filename);
            let comment = format!("{} Hz, {:.1} BPM, seed {}", args.sampling_rate, bpm, seed);

            save_samples(&filepath, &frames, Some(&comment))
                .with_context(|| format!("Failed to write {}", filepath.display()))?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                bpm,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sampling_rate: args.sampling_rate,
            duration: args.duration,
            baseline: args.baseline,
            amplitude: args.amplitude,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rates_comma_separated() {
        assert_eq!(parse_rates("60, 72,90").unwrap(), vec![60.0, 72.0, 90.0]);
    }

    #[test]
    fn test_parse_rates_range() {
        assert_eq!(parse_rates("50-80:10").unwrap(), vec![50.0, 60.0, 70.0, 80.0]);
    }

    #[test]
    fn test_parse_rates_invalid() {
        assert!(parse_rates("fast").is_err());
        assert!(parse_rates("50-80:0").is_err());
        assert!(parse_rates("50:10").is_err());
    }

    #[test]
    fn test_noise_config_from_toml() {
        let config: NoiseConfig = toml::from_str(
            r#"
            [additive]
            snr_db = 15.0

            [baseline_drift]
            amplitude = 8.0
            frequency_hz = 0.05
            "#,
        )
        .unwrap();
        assert_eq!(config.additive.unwrap().snr_db, 15.0);
        assert!(config.flicker.is_none());
    }
}
