//! Physiological plausibility checks on a set of detected peaks

use serde::Serialize;

use crate::signal_processing::math::coefficient_of_variation;

/// Fewest peaks that can describe a rhythm
pub const MIN_PEAKS: usize = 3;
/// Slowest plausible peak rate (peaks per minute)
const MIN_PEAKS_PER_MINUTE: f64 = 20.0;
/// Fastest plausible peak rate (peaks per minute)
const MAX_PEAKS_PER_MINUTE: f64 = 220.0;
/// Interval CV above which the rhythm is considered motion-corrupted
const MAX_INTERVAL_CV: f64 = 0.8;
/// Amplitude CV above which lighting is considered unstable
const MAX_AMPLITUDE_CV: f64 = 1.2;

/// Outcome of [`PeakValidator::validate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakValidation {
    pub is_valid: bool,
    pub reason: String,
    /// In `[0, 1]`
    pub confidence: f64,
    /// In `[0, 1]`
    pub quality: f64,
}

impl PeakValidation {
    fn rejected(reason: String, confidence: f64, quality: f64) -> Self {
        Self {
            is_valid: false,
            reason,
            confidence,
            quality,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeakValidator {
    sampling_rate: f64,
}

impl PeakValidator {
    pub fn new(sampling_rate: u32) -> Self {
        Self {
            sampling_rate: sampling_rate as f64,
        }
    }

    /// Check a peak set against the window it was detected in
    ///
    /// Checks run in order and the first failure wins: peak count, peak
    /// rate, interval regularity, amplitude consistency.
    pub fn validate(&self, peaks: &[usize], signal: &[f64]) -> PeakValidation {
        if peaks.len() < MIN_PEAKS {
            return PeakValidation::rejected(
                format!(
                    "Insufficient peaks (found {}, need \u{2265}{})",
                    peaks.len(),
                    MIN_PEAKS
                ),
                0.0,
                0.0,
            );
        }

        let duration_secs = signal.len() as f64 / self.sampling_rate;
        let peaks_per_minute = peaks.len() as f64 / duration_secs * 60.0;
        if !(MIN_PEAKS_PER_MINUTE..=MAX_PEAKS_PER_MINUTE).contains(&peaks_per_minute) {
            return PeakValidation::rejected(
                format!("Unrealistic peak rate: {} peaks/min", peaks_per_minute as i64),
                0.3,
                0.2,
            );
        }

        let intervals: Vec<f64> = peaks
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64 / self.sampling_rate)
            .collect();
        let interval_cv = coefficient_of_variation(&intervals);
        if interval_cv > MAX_INTERVAL_CV {
            return PeakValidation::rejected(
                format!(
                    "Irregular peak intervals (CV={:.2}), hold still for reading",
                    interval_cv
                ),
                (0.6 - interval_cv * 0.3).max(0.3),
                0.3,
            );
        }

        let amplitudes: Vec<f64> = peaks
            .iter()
            .filter_map(|&idx| signal.get(idx).copied())
            .collect();
        let amplitude_cv = coefficient_of_variation(&amplitudes);
        if amplitude_cv > MAX_AMPLITUDE_CV {
            return PeakValidation::rejected(
                "Inconsistent peak amplitudes - improve lighting".to_string(),
                0.5,
                0.4,
            );
        }

        let regularity = (1.0 - interval_cv * 1.2).max(0.0);
        let consistency = (1.0 - amplitude_cv * 0.5).max(0.0);
        let quality = regularity * 0.7 + consistency * 0.3;

        PeakValidation {
            is_valid: true,
            reason: "Valid".to_string(),
            confidence: quality,
            quality,
        }
    }
}
