use serde::Serialize;

use crate::constants::{MAX_RR_INTERVAL_SECS, MIN_RR_INTERVAL_SECS};
use crate::peaks::validator::MIN_PEAKS;
use crate::signal_processing::math::{mean, median_of_sorted, sorted};

use super::peak_intervals;

/// Fence width in IQRs for interval outlier rejection
const IQR_OUTLIER_FACTOR: f64 = 1.5;
/// Mean/median disagreement (BPM) above which only the median is trusted
const MEAN_MEDIAN_TOLERANCE_BPM: f64 = 10.0;

/// Heart rate summary for one window
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HeartRateMetrics {
    /// Robust central BPM estimate
    pub mean_bpm: f64,
    pub min_bpm: f64,
    pub max_bpm: f64,
    /// Spread of the instantaneous BPM around `mean_bpm`
    pub std_dev: f64,
    pub instantaneous_bpm: Vec<f64>,
}

impl HeartRateMetrics {
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.mean_bpm > 0.0
    }
}

/// Robust BPM estimation from peak positions
#[derive(Debug, Clone)]
pub struct HeartRateCalculator {
    sampling_rate: f64,
}

impl HeartRateCalculator {
    pub fn new(sampling_rate: u32) -> Self {
        Self {
            sampling_rate: sampling_rate as f64,
        }
    }

    /// Heart rate from peak sample indices
    ///
    /// Needs at least three peaks (two intervals).
    pub fn calculate(&self, peaks: &[usize]) -> HeartRateMetrics {
        if peaks.len() < MIN_PEAKS {
            return HeartRateMetrics::invalid();
        }
        Self::from_intervals(&peak_intervals(peaks, self.sampling_rate, 1.0))
    }

    /// Heart rate from RR intervals in seconds
    ///
    /// Intervals outside the physiological range are dropped, then an IQR
    /// fence removes outliers among the rest. The final BPM blends the median
    /// and the mean of the instantaneous rates unless they disagree by more
    /// than 10 BPM, in which case the median alone is used.
    pub fn from_intervals(rr_secs: &[f64]) -> HeartRateMetrics {
        let physiological: Vec<f64> = rr_secs
            .iter()
            .copied()
            .filter(|rr| (MIN_RR_INTERVAL_SECS..=MAX_RR_INTERVAL_SECS).contains(rr))
            .collect();
        if physiological.len() < 2 {
            return HeartRateMetrics::invalid();
        }

        let cleaned = remove_outliers_iqr(&physiological);
        if cleaned.len() < 2 {
            return HeartRateMetrics::invalid();
        }

        let instantaneous_bpm: Vec<f64> = cleaned.iter().map(|rr| 60.0 / rr).collect();
        let sorted_bpm = sorted(&instantaneous_bpm);
        let median_bpm = median_of_sorted(&sorted_bpm);
        let average_bpm = mean(&instantaneous_bpm);

        let final_bpm = if (average_bpm - median_bpm).abs() > MEAN_MEDIAN_TOLERANCE_BPM {
            median_bpm
        } else {
            (average_bpm + median_bpm) / 2.0
        };

        let variance = instantaneous_bpm
            .iter()
            .map(|bpm| (bpm - final_bpm).powi(2))
            .sum::<f64>()
            / instantaneous_bpm.len() as f64;

        HeartRateMetrics {
            mean_bpm: final_bpm,
            min_bpm: sorted_bpm[0],
            max_bpm: sorted_bpm[sorted_bpm.len() - 1],
            std_dev: variance.sqrt(),
            instantaneous_bpm,
        }
    }
}

/// Keep values inside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`, preserving order
///
/// Fewer than four values are returned as-is.
fn remove_outliers_iqr(values: &[f64]) -> Vec<f64> {
    if values.len() < 4 {
        return values.to_vec();
    }
    let sorted = sorted(values);
    let q1 = sorted[sorted.len() / 4];
    let q3 = sorted[sorted.len() * 3 / 4];
    let iqr = q3 - q1;
    let lower = q1 - IQR_OUTLIER_FACTOR * iqr;
    let upper = q3 + IQR_OUTLIER_FACTOR * iqr;
    values
        .iter()
        .copied()
        .filter(|v| (lower..=upper).contains(v))
        .collect()
}
