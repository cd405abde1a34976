//! Numeric constants for signal processing stability and physiological limits
//!
//! Thresholds shared by more than one pipeline stage live here. Stage-local
//! tuning (kernel coefficients, CV limits) stays with the stage that owns it.

/// Means with a magnitude below this are treated as zero when forming a
/// coefficient of variation.
pub const CV_MEAN_EPSILON: f64 = 1e-10;

/// Shortest RR interval accepted for heart rate, in seconds (200 BPM).
pub const MIN_RR_INTERVAL_SECS: f64 = 0.3;

/// Longest RR interval accepted for heart rate, in seconds (40 BPM).
pub const MAX_RR_INTERVAL_SECS: f64 = 1.5;

/// Shortest NN interval accepted for HRV, in milliseconds.
pub const MIN_NN_INTERVAL_MS: f64 = 300.0;

/// Longest NN interval accepted for HRV, in milliseconds.
pub const MAX_NN_INTERVAL_MS: f64 = 2000.0;

/// Lowest heart rate reported as a successful measurement.
pub const MIN_VALID_BPM: f64 = 40.0;

/// Highest heart rate reported as a successful measurement.
pub const MAX_VALID_BPM: f64 = 200.0;
