//! Synthetic camera PPG streams for tests and tooling

mod measure;
mod noise;
mod signal;

pub use measure::{BpmMeasurement, ErrorStats, measure_bpm, measure_error_across_rates};
pub use noise::{
    AdditiveNoiseConfig, BaselineDriftConfig, FlickerConfig, MotionArtifactConfig, NoiseConfig,
    ac_power, apply_noise, generate_noisy_ppg_signal,
};
pub use signal::{
    SECOND_HARMONIC, THIRD_HARMONIC, generate_ppg_signal, generate_ppg_signal_with_bpm_fn,
    pulse_shape,
};
