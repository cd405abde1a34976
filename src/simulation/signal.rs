use std::f64::consts::PI;

/// Relative amplitude of the second harmonic (dicrotic shape)
pub const SECOND_HARMONIC: f64 = 0.5;
/// Relative amplitude of the third harmonic
pub const THIRD_HARMONIC: f64 = 0.2;

/// One sample of the unit pulse waveform at cardiac phase `theta` (radians)
///
/// Fundamental plus phase-shifted 2nd and 3rd harmonics, giving the sharp
/// systolic upstroke and slower diastolic decay of a fingertip/face PPG.
pub fn pulse_shape(theta: f64) -> f64 {
    theta.sin()
        + SECOND_HARMONIC * (2.0 * theta - 0.6).sin()
        + THIRD_HARMONIC * (3.0 * theta - 1.2).sin()
}

/// Generate a synthetic camera PPG stream at a fixed heart rate
///
/// `baseline` is the mean ROI intensity, `amplitude` scales the pulsatile
/// component.
pub fn generate_ppg_signal(
    duration_secs: f64,
    sampling_rate: u32,
    bpm: f64,
    baseline: f64,
    amplitude: f64,
) -> Vec<f64> {
    generate_ppg_signal_with_bpm_fn(duration_secs, sampling_rate, baseline, amplitude, |_| bpm)
}

/// Generate a synthetic camera PPG stream with a time-varying heart rate
///
/// `bpm_fn` takes time in seconds and returns the instantaneous heart rate.
/// Cardiac phase is integrated sample by sample so rate changes stay
/// continuous.
pub fn generate_ppg_signal_with_bpm_fn<F>(
    duration_secs: f64,
    sampling_rate: u32,
    baseline: f64,
    amplitude: f64,
    bpm_fn: F,
) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let num_samples = (duration_secs * sampling_rate as f64).round() as usize;
    let dt = 1.0 / sampling_rate as f64;
    let mut samples = Vec::with_capacity(num_samples);
    let mut theta = 0.0;

    for i in 0..num_samples {
        let t = i as f64 * dt;
        samples.push(baseline + amplitude * pulse_shape(theta));
        theta += 2.0 * PI * bpm_fn(t) / 60.0 * dt;
    }

    samples
}
