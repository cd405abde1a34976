mod adaptive_percentile;
mod characteristic_wave;
pub mod validator;

pub use adaptive_percentile::AdaptivePercentileDetector;
pub use characteristic_wave::CharacteristicWaveDetector;
pub use validator::{PeakValidation, PeakValidator};

use crate::config::PeakMethod;
use crate::signal_processing::math::centered_moving_average;

/// Windows shorter than this never yield peaks.
const MIN_DETECTION_SAMPLES: usize = 10;

/// Light pre-smoothing applied before either strategy runs.
const PRE_SMOOTHING_WINDOW: usize = 3;

/// Systolic peak detection strategy
///
/// Implementors only provide [`detect`](PeakDetector::detect), which sees the
/// pre-smoothed window. Callers use [`find_peaks`](PeakDetector::find_peaks).
pub trait PeakDetector: Send {
    /// Locate peaks in an already pre-smoothed window
    ///
    /// Returns strictly increasing indices.
    fn detect(&self, smoothed: &[f64]) -> Vec<usize>;

    /// Which preset this detector implements
    fn method(&self) -> PeakMethod;

    /// Pre-smooth a cleaned window and locate its systolic peaks
    fn find_peaks(&self, cleaned: &[f64]) -> Vec<usize> {
        if cleaned.len() < MIN_DETECTION_SAMPLES {
            return Vec::new();
        }
        let smoothed = centered_moving_average(cleaned, PRE_SMOOTHING_WINDOW);
        self.detect(&smoothed)
    }
}

/// Build the detector for a configured method
pub fn create_detector(method: PeakMethod, sampling_rate: u32) -> Box<dyn PeakDetector> {
    match method {
        PeakMethod::CharacteristicWave => Box::new(CharacteristicWaveDetector::new(sampling_rate)),
        PeakMethod::AdaptivePercentile => Box::new(AdaptivePercentileDetector::new(sampling_rate)),
    }
}
