use std::f64::consts::PI;
use std::fmt;

use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::Serialize;

use crate::error::{PpgError, Result};

/// Fractional width of each raised-cosine transition, relative to its edge
/// frequency.
const TRANSITION_FRACTION: f64 = 0.3;

/// Pass band edges in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Gain applied at `freq_hz`, in `[0, 1]`
    ///
    /// Zero below `low*(1-0.3)`, raised-cosine up to one at `low*(1+0.3)`,
    /// flat, then raised-cosine back down between `high*(1-0.3)` and
    /// `high*(1+0.3)`.
    pub fn response(&self, freq_hz: f64) -> f64 {
        let low_start = self.low_hz * (1.0 - TRANSITION_FRACTION);
        let low_end = self.low_hz * (1.0 + TRANSITION_FRACTION);
        let low = if freq_hz < low_start {
            0.0
        } else if freq_hz > low_end {
            1.0
        } else {
            let x = (freq_hz - low_start) / (low_end - low_start);
            0.5 * (1.0 - (PI * x).cos())
        };

        let high_start = self.high_hz * (1.0 - TRANSITION_FRACTION);
        let high_end = self.high_hz * (1.0 + TRANSITION_FRACTION);
        let high = if freq_hz > high_end {
            0.0
        } else if freq_hz < high_start {
            1.0
        } else {
            let x = (freq_hz - high_start) / (high_end - high_start);
            0.5 * (1.0 + (PI * x).cos())
        };

        low * high
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}-{:.2} Hz", self.low_hz, self.high_hz)
    }
}

/// Zero-phase band-pass filter applied in the frequency domain
///
/// The window is padded to the next power of two by mirroring its tail,
/// transformed, shaped bin by bin with [`FrequencyBand::response`], and
/// transformed back. Only the real part of the first `len` samples is kept.
/// No recursive state is carried between windows, so there is no phase
/// shift and no risk of an unstable IIR cascade.
pub struct BandpassFilter {
    band: FrequencyBand,
    sampling_rate: f64,
    planner: FftPlanner<f64>,
}

impl fmt::Debug for BandpassFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BandpassFilter")
            .field("band", &self.band)
            .field("sampling_rate", &self.sampling_rate)
            .finish()
    }
}

impl BandpassFilter {
    /// Create a new band-pass filter
    ///
    /// # Arguments
    /// * `sampling_rate` - Sample rate of the windows to be filtered, in Hz
    /// * `band` - Pass band
    ///
    /// # Errors
    /// Returns `PpgError::FilterDesign` if the band is empty, starts at or
    /// below zero, or reaches past the Nyquist frequency.
    pub fn new(sampling_rate: f64, band: FrequencyBand) -> Result<Self> {
        let nyquist = sampling_rate / 2.0;
        if !(band.low_hz > 0.0 && band.high_hz > band.low_hz && band.high_hz <= nyquist) {
            return Err(PpgError::FilterDesign(format!(
                "Invalid band {} for sampling rate {} Hz",
                band, sampling_rate
            )));
        }
        Ok(Self {
            band,
            sampling_rate,
            planner: FftPlanner::new(),
        })
    }

    pub fn band(&self) -> FrequencyBand {
        self.band
    }

    /// Filter one window, returning a new window of the same length
    ///
    /// Windows shorter than four samples are returned unchanged.
    pub fn apply(&mut self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n < 4 {
            return signal.to_vec();
        }

        let padded_len = n.next_power_of_two();
        let mut spectrum: Vec<Complex64> = (0..padded_len)
            .map(|i| {
                let value = if i < n {
                    signal[i]
                } else {
                    // Mirror the tail into the padding; indices that fall off
                    // the front stay zero.
                    (2 * n)
                        .checked_sub(i + 2)
                        .and_then(|m| signal.get(m))
                        .copied()
                        .unwrap_or(0.0)
                };
                Complex64::new(value, 0.0)
            })
            .collect();

        self.planner
            .plan_fft_forward(padded_len)
            .process(&mut spectrum);

        let resolution = self.sampling_rate / padded_len as f64;
        for (i, bin) in spectrum.iter_mut().enumerate() {
            let freq = if i <= padded_len / 2 {
                i as f64 * resolution
            } else {
                (padded_len - i) as f64 * resolution
            };
            *bin *= self.band.response(freq);
        }

        self.planner
            .plan_fft_inverse(padded_len)
            .process(&mut spectrum);

        let scale = 1.0 / padded_len as f64;
        spectrum[..n].iter().map(|c| c.re * scale).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq_hz: f64, sampling_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / sampling_rate).sin())
            .collect()
    }

    // RMS over the interior, away from the window edges
    fn interior_rms(signal: &[f64]) -> f64 {
        let interior = &signal[30..signal.len() - 30];
        (interior.iter().map(|x| x * x).sum::<f64>() / interior.len() as f64).sqrt()
    }

    #[test]
    fn test_band_response_shape() {
        let band = FrequencyBand::new(0.5, 3.5);
        assert_eq!(band.response(0.0), 0.0);
        assert_eq!(band.response(0.3), 0.0);
        assert!((band.response(0.5) - 0.5).abs() < 1e-9);
        assert_eq!(band.response(1.2), 1.0);
        assert!((band.response(3.5) - 0.5).abs() < 1e-9);
        assert_eq!(band.response(5.0), 0.0);
    }

    #[test]
    fn test_invalid_band_rejected() {
        assert!(BandpassFilter::new(30.0, FrequencyBand::new(3.5, 0.5)).is_err());
        assert!(BandpassFilter::new(30.0, FrequencyBand::new(0.0, 3.5)).is_err());
        assert!(BandpassFilter::new(30.0, FrequencyBand::new(0.5, 20.0)).is_err());
        assert!(BandpassFilter::new(30.0, FrequencyBand::new(0.5, 8.0)).is_ok());
    }

    #[test]
    fn test_passes_heart_rate_band_without_phase_shift() {
        let mut filter = BandpassFilter::new(30.0, FrequencyBand::new(0.5, 3.5)).unwrap();
        let input = tone(1.2, 30.0, 300);
        let output = filter.apply(&input);

        assert_eq!(output.len(), input.len());
        let ratio = interior_rms(&output) / interior_rms(&input);
        assert!(ratio > 0.95, "1.2 Hz attenuated: ratio {}", ratio);

        let max_diff = output[30..270]
            .iter()
            .zip(&input[30..270])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(max_diff < 0.1, "waveform distorted by {}", max_diff);
    }

    #[test]
    fn test_rejects_baseline_wander() {
        let mut filter = BandpassFilter::new(30.0, FrequencyBand::new(0.5, 3.5)).unwrap();
        let input = tone(0.1, 30.0, 300);
        let ratio = interior_rms(&filter.apply(&input)) / interior_rms(&input);
        assert!(ratio < 0.1, "0.1 Hz not attenuated: ratio {}", ratio);
    }

    #[test]
    fn test_band_presets_differ_above_narrow_cutoff() {
        let input = tone(6.0, 30.0, 300);

        let mut narrow = BandpassFilter::new(30.0, FrequencyBand::new(0.5, 3.5)).unwrap();
        let narrow_ratio = interior_rms(&narrow.apply(&input)) / interior_rms(&input);
        assert!(narrow_ratio < 0.05, "narrow band ratio {}", narrow_ratio);

        let mut wide = BandpassFilter::new(30.0, FrequencyBand::new(0.5, 8.0)).unwrap();
        let wide_ratio = interior_rms(&wide.apply(&input)) / interior_rms(&input);
        assert!(wide_ratio > 0.9, "wide band ratio {}", wide_ratio);
    }

    #[test]
    fn test_short_window_passthrough() {
        let mut filter = BandpassFilter::new(30.0, FrequencyBand::new(0.5, 3.5)).unwrap();
        assert_eq!(filter.apply(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
        assert!(filter.apply(&[]).is_empty());
    }
}
