use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Impairments applied to a synthetic PPG stream
///
/// Every field is optional; an all-`None` config returns the input unchanged.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub baseline_drift: Option<BaselineDriftConfig>,
    pub flicker: Option<FlickerConfig>,
    pub motion: Option<MotionArtifactConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, snr_db: f64) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }

    pub fn with_baseline_drift(mut self, amplitude: f64, frequency_hz: f64) -> Self {
        self.baseline_drift = Some(BaselineDriftConfig {
            amplitude,
            frequency_hz,
        });
        self
    }

    pub fn with_flicker(mut self, amplitude: f64, frequency_hz: f64) -> Self {
        self.flicker = Some(FlickerConfig {
            amplitude,
            frequency_hz,
        });
        self
    }

    pub fn with_motion(mut self, rate_hz: f64, amplitude: f64, duration_samples: usize) -> Self {
        self.motion = Some(MotionArtifactConfig {
            rate_hz,
            amplitude,
            duration_samples,
        });
        self
    }
}

/// White Gaussian sensor noise at an SNR relative to the pulsatile (AC) power
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    pub snr_db: f64,
}

/// Slow sinusoidal baseline wander (breathing, auto-exposure)
#[derive(Clone, Debug, serde::Deserialize)]
pub struct BaselineDriftConfig {
    pub amplitude: f64,
    pub frequency_hz: f64,
}

/// Periodic lighting flicker aliased into the frame rate
#[derive(Clone, Debug, serde::Deserialize)]
pub struct FlickerConfig {
    pub amplitude: f64,
    pub frequency_hz: f64,
}

/// Randomly timed step artifacts from head or hand movement
#[derive(Clone, Debug, serde::Deserialize)]
pub struct MotionArtifactConfig {
    pub rate_hz: f64,
    pub amplitude: f64,
    pub duration_samples: usize,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Mean power of the signal with its mean removed
pub fn ac_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let mean = signal.iter().sum::<f64>() / signal.len() as f64;
    signal.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / signal.len() as f64
}

fn apply_additive_noise(signal: &mut [f64], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let power = ac_power(signal);
    if power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f64.powf(config.snr_db / 10.0);
    let noise_std = (power / snr_linear).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std) else {
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng);
    }
}

fn apply_sinusoid(signal: &mut [f64], amplitude: f64, frequency_hz: f64, sampling_rate: f64) {
    for (i, sample) in signal.iter_mut().enumerate() {
        let t = i as f64 / sampling_rate;
        *sample += amplitude * (2.0 * PI * frequency_hz * t).sin();
    }
}

fn apply_motion_artifacts(
    signal: &mut [f64],
    config: &MotionArtifactConfig,
    sampling_rate: f64,
    rng: &mut ChaCha8Rng,
) {
    if config.rate_hz <= 0.0 || signal.is_empty() {
        return;
    }

    let avg_samples_between = sampling_rate / config.rate_hz;
    let mut pos = 0usize;

    loop {
        let interval = (rng.random::<f64>() * 2.0 * avg_samples_between) as usize;
        pos += interval.max(1);
        if pos >= signal.len() {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let end = (pos + config.duration_samples.max(1)).min(signal.len());
        for sample in &mut signal[pos..end] {
            *sample += sign * config.amplitude;
        }
    }
}

/// Apply every configured impairment, in a fixed order
///
/// Additive noise is scaled against the clean signal, before drift or
/// flicker are added.
pub fn apply_noise(signal: &[f64], config: &NoiseConfig, sampling_rate: f64) -> Vec<f64> {
    let mut rng = create_rng(config.seed);
    let mut out = signal.to_vec();

    if let Some(ref additive) = config.additive {
        apply_additive_noise(&mut out, additive, &mut rng);
    }
    if let Some(ref drift) = config.baseline_drift {
        apply_sinusoid(&mut out, drift.amplitude, drift.frequency_hz, sampling_rate);
    }
    if let Some(ref flicker) = config.flicker {
        apply_sinusoid(&mut out, flicker.amplitude, flicker.frequency_hz, sampling_rate);
    }
    if let Some(ref motion) = config.motion {
        apply_motion_artifacts(&mut out, motion, sampling_rate, &mut rng);
    }

    out
}

/// Generate a PPG stream and impair it in one call
pub fn generate_noisy_ppg_signal(
    duration_secs: f64,
    sampling_rate: u32,
    bpm: f64,
    noise_config: &NoiseConfig,
) -> Vec<f64> {
    let clean = super::generate_ppg_signal(duration_secs, sampling_rate, bpm, 120.0, 4.0);
    apply_noise(&clean, noise_config, sampling_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> Vec<f64> {
        (0..300).map(|i| 120.0 + (i as f64 * 0.25).sin()).collect()
    }

    #[test]
    fn test_additive_noise_changes_signal() {
        let config = NoiseConfig::default().with_seed(42).with_awgn(10.0);
        let noisy = apply_noise(&clean(), &config, 30.0);
        assert_eq!(noisy.len(), 300);
        assert_ne!(noisy, clean());
    }

    #[test]
    fn test_additive_noise_power_tracks_snr() {
        let signal: Vec<f64> = (0..30_000).map(|i| 120.0 + (i as f64 * 0.25).sin()).collect();
        let config = NoiseConfig::default().with_seed(7).with_awgn(10.0);
        let noisy = apply_noise(&signal, &config, 30.0);
        let residual: Vec<f64> = noisy.iter().zip(&signal).map(|(n, s)| n - s).collect();
        let ratio = ac_power(&residual) / ac_power(&signal);
        assert!((ratio - 0.1).abs() < 0.01, "noise/signal power {}", ratio);
    }

    #[test]
    fn test_seeded_rng_reproducibility() {
        let config = NoiseConfig::default()
            .with_seed(12345)
            .with_awgn(20.0)
            .with_motion(1.0, 10.0, 2);
        assert_eq!(
            apply_noise(&clean(), &config, 30.0),
            apply_noise(&clean(), &config, 30.0)
        );
    }

    #[test]
    fn test_drift_and_flicker_are_deterministic_offsets() {
        let config = NoiseConfig::default()
            .with_baseline_drift(8.0, 0.05)
            .with_flicker(2.0, 10.0);
        let out = apply_noise(&[0.0; 300], &config, 30.0);
        assert_eq!(out[0], 0.0);
        let expected = 8.0 * (2.0 * PI * 0.05 * 5.0).sin() + 2.0 * (2.0 * PI * 10.0 * 5.0).sin();
        assert!((out[150] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_motion_artifacts_are_steps_of_fixed_size() {
        let config = NoiseConfig::default().with_seed(3).with_motion(2.0, 10.0, 3);
        let out = apply_noise(&[0.0; 300], &config, 30.0);
        let hits = out.iter().filter(|v| v.abs() > 0.0).count();
        assert!(hits > 0);
        assert!(out.iter().all(|v| (v.abs() % 10.0).abs() < 1e-9));
    }

    #[test]
    fn test_empty_config_is_identity() {
        assert_eq!(apply_noise(&clean(), &NoiseConfig::default(), 30.0), clean());
    }
}
