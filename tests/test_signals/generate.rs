use std::f64::consts::PI;

/// Mean green intensity of a well-lit fingertip ROI
pub const BASELINE: f64 = 120.0;
/// Pulsatile amplitude on top of the baseline
pub const AMPLITUDE: f64 = 4.0;

/// Fundamental plus dicrotic harmonics, peak-to-peak roughly 3.1 for unit amplitude
fn pulse(theta: f64) -> f64 {
    theta.sin() + 0.5 * (2.0 * theta - 0.6).sin() + 0.2 * (3.0 * theta - 1.2).sin()
}

/// Generate a camera brightness stream with a fixed heart rate
pub fn generate_test_signal(duration_secs: f64, sampling_rate: u32, bpm: f64) -> Vec<f64> {
    generate_test_signal_with_phase(duration_secs, sampling_rate, bpm, 0.0)
}

/// Same as [`generate_test_signal`] but starting at `phase` radians into the beat
pub fn generate_test_signal_with_phase(
    duration_secs: f64,
    sampling_rate: u32,
    bpm: f64,
    phase: f64,
) -> Vec<f64> {
    let num_samples = (duration_secs * sampling_rate as f64).round() as usize;
    let beat_hz = bpm / 60.0;

    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sampling_rate as f64;
            BASELINE + AMPLITUDE * pulse(2.0 * PI * beat_hz * t + phase)
        })
        .collect()
}

/// Generate a stream whose heart rate follows `bpm_fn` (time in seconds to BPM)
///
/// Phase is integrated sample by sample so rate changes stay continuous.
pub fn generate_test_signal_with_bpm_fn<F>(
    duration_secs: f64,
    sampling_rate: u32,
    bpm_fn: F,
) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let num_samples = (duration_secs * sampling_rate as f64).round() as usize;
    let dt = 1.0 / sampling_rate as f64;
    let mut phase = 0.0;
    let mut samples = Vec::with_capacity(num_samples);

    for i in 0..num_samples {
        samples.push(BASELINE + AMPLITUDE * pulse(phase));
        phase += 2.0 * PI * bpm_fn(i as f64 * dt) / 60.0 * dt;
    }

    samples
}
