//! Rate and variability statistics computed from a peak set

pub mod heart_rate;
pub mod hrv;

pub use heart_rate::{HeartRateCalculator, HeartRateMetrics};
pub use hrv::{HrvAnalyzer, HrvMetrics};

/// Spacing between consecutive peaks, scaled from samples to the caller's unit
///
/// `units_per_second` is 1.0 for seconds and 1000.0 for milliseconds.
pub(crate) fn peak_intervals(
    peaks: &[usize],
    sampling_rate: f64,
    units_per_second: f64,
) -> Vec<f64> {
    peaks
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 * units_per_second / sampling_rate)
        .collect()
}
