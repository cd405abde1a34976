use pulsecam::simulation::{
    NoiseConfig, apply_noise, generate_noisy_ppg_signal, measure_bpm, measure_error_across_rates,
};
use pulsecam::{PeakMethod, PpgConfig};

const TEST_RATES: [f64; 3] = [60.0, 72.0, 90.0];
const MAX_BPM_ERROR: f64 = 5.0;

fn config_for(method: PeakMethod) -> PpgConfig {
    PpgConfig {
        method,
        ..PpgConfig::default()
    }
}

fn assert_robust(label: &str, noise: &NoiseConfig, method: PeakMethod) {
    let stats = measure_error_across_rates(noise, &config_for(method), &TEST_RATES);
    println!(
        "{} / {}: max error {:.2} BPM, {} failures",
        label, method, stats.max_error, stats.failures
    );
    assert_eq!(stats.failures, 0, "{} / {}: rates without a reading", label, method);
    assert!(
        stats.max_error < MAX_BPM_ERROR,
        "{} / {}: max error {:.2} BPM",
        label,
        method,
        stats.max_error
    );
}

#[test]
fn test_awgn_15db() {
    for seed in [1, 2, 3] {
        let noise = NoiseConfig::default().with_seed(seed).with_awgn(15.0);
        assert_robust("AWGN 15 dB", &noise, PeakMethod::AdaptivePercentile);
        assert_robust("AWGN 15 dB", &noise, PeakMethod::CharacteristicWave);
    }
}

#[test]
fn test_awgn_10db() {
    for seed in [4, 5, 6] {
        let noise = NoiseConfig::default().with_seed(seed).with_awgn(10.0);
        assert_robust("AWGN 10 dB", &noise, PeakMethod::AdaptivePercentile);
        assert_robust("AWGN 10 dB", &noise, PeakMethod::CharacteristicWave);
    }
}

#[test]
fn test_baseline_drift() {
    let noise = NoiseConfig::default()
        .with_seed(11)
        .with_awgn(20.0)
        .with_baseline_drift(8.0, 0.05);
    assert_robust("drift", &noise, PeakMethod::AdaptivePercentile);
    assert_robust("drift", &noise, PeakMethod::CharacteristicWave);
}

#[test]
fn test_lighting_flicker() {
    let noise = NoiseConfig::default()
        .with_seed(12)
        .with_awgn(20.0)
        .with_flicker(2.0, 10.0);
    assert_robust("flicker", &noise, PeakMethod::AdaptivePercentile);
    assert_robust("flicker", &noise, PeakMethod::CharacteristicWave);
}

#[test]
fn test_occasional_motion_artifacts() {
    for seed in [21, 22, 23] {
        let noise = NoiseConfig::default()
            .with_seed(seed)
            .with_awgn(20.0)
            .with_motion(0.5, 10.0, 2);
        assert_robust("motion", &noise, PeakMethod::AdaptivePercentile);
    }
}

#[test]
fn test_every_window_reports_under_noise() {
    let noise = NoiseConfig::default().with_seed(99).with_awgn(15.0);
    let signal = generate_noisy_ppg_signal(15.0, 30, 72.0, &noise);
    let measurement = measure_bpm(&signal, &PpgConfig::default());

    assert_eq!(measurement.windows, 11);
    assert!(
        measurement.successes >= 9,
        "only {} of {} windows succeeded",
        measurement.successes,
        measurement.windows
    );
}

#[test]
fn test_pure_noise_never_exceeds_confidence_bounds() {
    let clean = vec![120.0; 450];
    let noise = NoiseConfig::default()
        .with_seed(5)
        .with_motion(3.0, 6.0, 1)
        .with_flicker(1.5, 7.0);
    let signal = apply_noise(&clean, &noise, 30.0);
    let measurement = measure_bpm(&signal, &PpgConfig::default());

    assert_eq!(measurement.windows, 11);
    if let Some(confidence) = measurement.last_result.and_then(|r| r.confidence()) {
        assert!((0.0..=100.0).contains(&confidence), "{}", confidence);
    }
}
