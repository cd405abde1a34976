use crate::config::PpgConfig;
use crate::processing::PpgProcessor;
use crate::result::PpgResult;

use super::{NoiseConfig, generate_noisy_ppg_signal};

/// Frames between analysis runs when replaying a stream
const ANALYZE_EVERY_N_FRAMES: usize = 15;

/// Outcome of replaying a whole stream through a processor
#[derive(Debug, Clone, Default)]
pub struct BpmMeasurement {
    /// Mean of all successful window estimates
    pub bpm: Option<f64>,
    /// Windows analyzed once the buffer was full
    pub windows: usize,
    pub successes: usize,
    pub last_result: Option<PpgResult>,
}

/// Feed `samples` to a fresh processor, analyzing every 15 frames once full
pub fn measure_bpm(samples: &[f64], config: &PpgConfig) -> BpmMeasurement {
    let mut processor = match PpgProcessor::new(config) {
        Ok(p) => p,
        Err(_) => return BpmMeasurement::default(),
    };

    let mut estimates = Vec::new();
    let mut measurement = BpmMeasurement::default();

    for (i, &sample) in samples.iter().enumerate() {
        processor.add_sample(sample);
        if (i + 1) % ANALYZE_EVERY_N_FRAMES != 0 || !processor.is_ready() {
            continue;
        }
        let result = processor.process();
        measurement.windows += 1;
        if let Some(bpm) = result.bpm() {
            estimates.push(bpm);
        }
        measurement.last_result = Some(result);
    }

    measurement.successes = estimates.len();
    if !estimates.is_empty() {
        measurement.bpm = Some(estimates.iter().sum::<f64>() / estimates.len() as f64);
    }
    measurement
}

#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    /// Largest absolute BPM error among rates that produced an estimate
    pub max_error: f64,
    /// Rates that produced no successful window
    pub failures: usize,
}

/// Generate, impair and measure a 15 s stream at each heart rate
pub fn measure_error_across_rates(
    noise_config: &NoiseConfig,
    ppg_config: &PpgConfig,
    test_rates: &[f64],
) -> ErrorStats {
    let mut stats = ErrorStats::default();

    for &bpm in test_rates {
        let signal = generate_noisy_ppg_signal(15.0, ppg_config.sampling_rate, bpm, noise_config);
        match measure_bpm(&signal, ppg_config).bpm {
            Some(measured) => stats.max_error = stats.max_error.max((measured - bpm).abs()),
            None => stats.failures += 1,
        }
    }

    stats
}
