use serde::Serialize;

use crate::constants::{MAX_NN_INTERVAL_MS, MIN_NN_INTERVAL_MS};
use crate::peaks::validator::MIN_PEAKS;
use crate::signal_processing::math::{mean, std_dev};

use super::peak_intervals;

/// Histogram bin width for the triangular index (1/128 s)
const TRIANGULAR_BIN_WIDTH_MS: f64 = 7.8125;
/// Successive-difference threshold for NN50
const NN50_THRESHOLD_MS: f64 = 50.0;

/// Time-domain HRV metrics, all in milliseconds except the counts and ratios
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HrvMetrics {
    pub mean_nn: f64,
    pub sdnn: f64,
    pub rmssd: f64,
    pub sdsd: f64,
    pub nn50: usize,
    /// Percentage of successive differences above 50 ms
    pub pnn50: f64,
    pub triangular_index: f64,
}

impl HrvMetrics {
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.mean_nn > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct HrvAnalyzer {
    sampling_rate: f64,
}

impl HrvAnalyzer {
    pub fn new(sampling_rate: u32) -> Self {
        Self {
            sampling_rate: sampling_rate as f64,
        }
    }

    pub fn analyze(&self, peaks: &[usize]) -> HrvMetrics {
        if peaks.len() < MIN_PEAKS {
            return HrvMetrics::invalid();
        }
        Self::from_intervals_ms(&peak_intervals(peaks, self.sampling_rate, 1000.0))
    }

    /// HRV from NN intervals in milliseconds
    ///
    /// Intervals outside 300..=2000 ms are discarded first; at least two
    /// must remain.
    pub fn from_intervals_ms(rr_ms: &[f64]) -> HrvMetrics {
        let nn: Vec<f64> = rr_ms
            .iter()
            .copied()
            .filter(|rr| (MIN_NN_INTERVAL_MS..=MAX_NN_INTERVAL_MS).contains(rr))
            .collect();
        if nn.len() < 2 {
            return HrvMetrics::invalid();
        }

        let diffs: Vec<f64> = nn.windows(2).map(|w| w[1] - w[0]).collect();
        let rmssd = (diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt();
        let nn50 = diffs
            .iter()
            .filter(|d| d.abs() > NN50_THRESHOLD_MS)
            .count();

        HrvMetrics {
            mean_nn: mean(&nn),
            sdnn: std_dev(&nn),
            rmssd,
            sdsd: std_dev(&diffs),
            nn50,
            pnn50: nn50 as f64 / diffs.len() as f64 * 100.0,
            triangular_index: triangular_index(&nn),
        }
    }
}

/// Interval count divided by the height of the modal histogram bin
///
/// Zero when every interval is identical.
fn triangular_index(intervals: &[f64]) -> f64 {
    let min = intervals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = intervals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if intervals.is_empty() || max <= min {
        return 0.0;
    }

    let bin_count = ((max - min) / TRIANGULAR_BIN_WIDTH_MS) as usize + 1;
    let mut histogram = vec![0usize; bin_count];
    for &interval in intervals {
        let bin = (((interval - min) / TRIANGULAR_BIN_WIDTH_MS) as usize).min(bin_count - 1);
        histogram[bin] += 1;
    }

    match histogram.iter().max() {
        Some(&modal) if modal > 0 => intervals.len() as f64 / modal as f64,
        _ => 0.0,
    }
}
