use crate::config::PeakMethod;
use crate::signal_processing::math::{percentile_of_sorted, sorted};

use super::PeakDetector;

/// Minimum peak spacing in seconds (~171 BPM)
const MIN_DISTANCE_SECS: f64 = 0.35;
/// Samples compared on each side of a candidate
const NEIGHBORHOOD: usize = 3;
/// Threshold = P60 + THRESHOLD_IQR_FACTOR * IQR
const THRESHOLD_IQR_FACTOR: f64 = 0.4;
/// Minimum prominence as a fraction of the IQR
const PROMINENCE_IQR_FACTOR: f64 = 0.2;

/// Adaptive-percentile peak detector
///
/// Thresholds follow the window's own amplitude distribution, so the same
/// detector works across skin tones and lighting without calibration. A
/// sample is a peak when it is a local maximum over three neighbors on each
/// side, stands out from the deeper of its two flanking troughs by at least
/// the minimum prominence, clears the percentile threshold, and lies far
/// enough from the previously accepted peak.
#[derive(Debug, Clone)]
pub struct AdaptivePercentileDetector {
    min_distance: usize,
}

/// Amplitude thresholds derived from one window
#[derive(Debug, Clone, Copy, PartialEq)]
struct Thresholds {
    amplitude: f64,
    prominence: f64,
}

impl Thresholds {
    fn from_window(signal: &[f64]) -> Self {
        let sorted = sorted(signal);
        let p25 = percentile_of_sorted(&sorted, 0.25);
        let p60 = percentile_of_sorted(&sorted, 0.60);
        let p75 = percentile_of_sorted(&sorted, 0.75);
        let iqr = p75 - p25;
        Self {
            amplitude: p60 + THRESHOLD_IQR_FACTOR * iqr,
            prominence: PROMINENCE_IQR_FACTOR * iqr,
        }
    }
}

impl AdaptivePercentileDetector {
    pub fn new(sampling_rate: u32) -> Self {
        Self {
            min_distance: ((MIN_DISTANCE_SECS * sampling_rate as f64) as usize).max(9),
        }
    }

    /// Strictly above the immediate neighbors, at least the outer ones
    fn is_local_max(signal: &[f64], i: usize) -> bool {
        let v = signal[i];
        v > signal[i - 1]
            && v > signal[i + 1]
            && (2..=NEIGHBORHOOD).all(|k| v >= signal[i - k] && v >= signal[i + k])
    }

    /// Height above the higher of the two flanking minima
    fn prominence(signal: &[f64], i: usize) -> f64 {
        let left_min = signal[i - NEIGHBORHOOD..i]
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        let right_min = signal[i + 1..=i + NEIGHBORHOOD]
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        signal[i] - left_min.max(right_min)
    }
}

impl PeakDetector for AdaptivePercentileDetector {
    fn detect(&self, smoothed: &[f64]) -> Vec<usize> {
        let n = smoothed.len();
        if n <= 2 * NEIGHBORHOOD {
            return Vec::new();
        }

        let thresholds = Thresholds::from_window(smoothed);
        let mut peaks: Vec<usize> = Vec::new();

        for i in NEIGHBORHOOD..n - NEIGHBORHOOD {
            if let Some(&last) = peaks.last() {
                if i - last < self.min_distance {
                    continue;
                }
            }
            if smoothed[i] > thresholds.amplitude
                && Self::is_local_max(smoothed, i)
                && Self::prominence(smoothed, i) >= thresholds.prominence
            {
                peaks.push(i);
            }
        }

        log::trace!(
            "adaptive percentile: threshold {:.3}, prominence {:.3}, {} peaks",
            thresholds.amplitude,
            thresholds.prominence,
            peaks.len()
        );
        peaks
    }

    fn method(&self) -> PeakMethod {
        PeakMethod::AdaptivePercentile
    }
}
