use crate::config::PeakMethod;
use crate::signal_processing::math::centered_moving_average;

use super::PeakDetector;

/// Peak-window length in seconds (systolic upstroke)
const PEAK_WINDOW_SECS: f64 = 0.111;
/// Beat-window length in seconds (one beat at ~90 BPM)
const BEAT_WINDOW_SECS: f64 = 0.667;
/// Minimum peak spacing in seconds (200 BPM)
const MIN_DISTANCE_SECS: f64 = 0.3;
/// Threshold offset above the beat average, tuned low for camera signals
const ALPHA: f64 = 0.01;

/// Characteristic-wave peak detector (two moving averages)
///
/// The positive half-wave is squared to emphasize systolic peaks. A short
/// "peak" moving average is compared against a long "beat" moving average
/// raised by `ALPHA`; each contiguous run above that threshold is a candidate
/// block whose peak is the block maximum of the unsquared window. Peaks
/// closer than the minimum distance keep the larger amplitude.
#[derive(Debug, Clone)]
pub struct CharacteristicWaveDetector {
    peak_window: usize,
    beat_window: usize,
    min_distance: usize,
}

impl CharacteristicWaveDetector {
    pub fn new(sampling_rate: u32) -> Self {
        let fs = sampling_rate as f64;
        Self {
            peak_window: ((PEAK_WINDOW_SECS * fs) as usize).max(3),
            beat_window: ((BEAT_WINDOW_SECS * fs) as usize).max(5),
            min_distance: ((MIN_DISTANCE_SECS * fs) as usize).max(4),
        }
    }

    /// Candidate peaks, one per above-threshold block, before spacing is enforced
    fn block_peaks(&self, signal: &[f64]) -> Vec<usize> {
        // Negative lobes would otherwise square into blocks of their own.
        let squared: Vec<f64> = signal.iter().map(|&v| v.max(0.0).powi(2)).collect();
        let ma_peak = centered_moving_average(&squared, self.peak_window);
        let ma_beat = centered_moving_average(&squared, self.beat_window);

        let last = ma_peak.len().saturating_sub(1);
        let mut peaks = Vec::new();
        let mut block_start: Option<usize> = None;

        for (i, (&peak_avg, &beat_avg)) in ma_peak.iter().zip(&ma_beat).enumerate() {
            let above = peak_avg > beat_avg * (1.0 + ALPHA);
            match block_start {
                None if above => block_start = Some(i),
                Some(start) if !above || i == last => {
                    let end = if above { i + 1 } else { i };
                    if let Some(idx) = argmax(signal, start, end) {
                        peaks.push(idx);
                    }
                    block_start = None;
                }
                _ => {}
            }
        }
        peaks
    }

    fn enforce_min_distance(&self, candidates: &[usize], signal: &[f64]) -> Vec<usize> {
        let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
        for &idx in candidates {
            match kept.last_mut() {
                Some(prev) if idx - *prev < self.min_distance => {
                    if signal[idx] > signal[*prev] {
                        *prev = idx;
                    }
                }
                _ => kept.push(idx),
            }
        }
        kept
    }
}

impl PeakDetector for CharacteristicWaveDetector {
    fn detect(&self, smoothed: &[f64]) -> Vec<usize> {
        let candidates = self.block_peaks(smoothed);
        let peaks = self.enforce_min_distance(&candidates, smoothed);
        log::trace!(
            "characteristic wave: {} blocks, {} peaks",
            candidates.len(),
            peaks.len()
        );
        peaks
    }

    fn method(&self) -> PeakMethod {
        PeakMethod::CharacteristicWave
    }
}

/// Index of the first maximum in `signal[start..end]`
fn argmax(signal: &[f64], start: usize, end: usize) -> Option<usize> {
    if start >= end || end > signal.len() {
        return None;
    }
    let mut best = start;
    for i in start + 1..end {
        if signal[i] > signal[best] {
            best = i;
        }
    }
    Some(best)
}
