use serde::Deserialize;

use crate::signal_processing::Filter;

// Quadratic least-squares (Savitzky-Golay, order 2) smoothing kernels.
const KERNEL_5: [f64; 5] = [-3.0 / 35.0, 12.0 / 35.0, 17.0 / 35.0, 12.0 / 35.0, -3.0 / 35.0];
const KERNEL_7: [f64; 7] = [
    -2.0 / 21.0,
    3.0 / 21.0,
    6.0 / 21.0,
    7.0 / 21.0,
    6.0 / 21.0,
    3.0 / 21.0,
    -2.0 / 21.0,
];
const KERNEL_9: [f64; 9] = [
    -21.0 / 231.0,
    14.0 / 231.0,
    39.0 / 231.0,
    54.0 / 231.0,
    59.0 / 231.0,
    54.0 / 231.0,
    39.0 / 231.0,
    14.0 / 231.0,
    -21.0 / 231.0,
];

/// Median filter for isolated spike removal
///
/// Each sample is replaced by the median of its neighborhood, clamped at the
/// window edges. Motion spikes one or two frames wide disappear while slow
/// pulse edges pass through.
#[derive(Debug, Clone, Copy)]
pub struct MedianFilter {
    window: usize,
}

impl MedianFilter {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Filter for MedianFilter {
    fn apply(&self, signal: &[f64]) -> Vec<f64> {
        if signal.len() < self.window {
            return signal.to_vec();
        }
        let half = self.window / 2;
        let mut scratch = Vec::with_capacity(self.window);
        (0..signal.len())
            .map(|i| {
                let start = i.saturating_sub(half);
                let end = (i + half + 1).min(signal.len());
                scratch.clear();
                scratch.extend_from_slice(&signal[start..end]);
                scratch.sort_by(|a, b| a.total_cmp(b));
                scratch[scratch.len() / 2]
            })
            .collect()
    }
}

/// Supported smoothing kernel lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingWindow {
    Five,
    #[default]
    Seven,
    Nine,
}

impl SmoothingWindow {
    pub fn len(self) -> usize {
        self.coefficients().len()
    }

    fn coefficients(self) -> &'static [f64] {
        match self {
            Self::Five => &KERNEL_5,
            Self::Seven => &KERNEL_7,
            Self::Nine => &KERNEL_9,
        }
    }
}

/// Fixed-kernel smoothing filter preserving peak shape
///
/// Convolves with a precomputed quadratic least-squares kernel. The first and
/// last half-kernel samples are copied through unchanged rather than
/// convolved against a partial neighborhood.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothingFilter {
    window: SmoothingWindow,
}

impl SmoothingFilter {
    pub fn new(window: SmoothingWindow) -> Self {
        Self { window }
    }
}

impl Filter for SmoothingFilter {
    fn apply(&self, signal: &[f64]) -> Vec<f64> {
        let kernel = self.window.coefficients();
        if signal.len() < kernel.len() {
            return signal.to_vec();
        }
        let half = kernel.len() / 2;
        let mut out = signal.to_vec();
        for (i, slot) in out
            .iter_mut()
            .enumerate()
            .take(signal.len() - half)
            .skip(half)
        {
            *slot = kernel
                .iter()
                .zip(&signal[i - half..=i + half])
                .map(|(c, s)| c * s)
                .sum();
        }
        out
    }
}

/// Noise reduction stage configuration
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct NoiseReductionConfig {
    /// Median filter window in samples
    pub median_window: usize,
    /// Smoothing kernel length
    pub smoothing_window: SmoothingWindow,
}

impl Default for NoiseReductionConfig {
    fn default() -> Self {
        Self {
            median_window: 3,
            smoothing_window: SmoothingWindow::Seven,
        }
    }
}

/// Median de-spiking followed by fixed-kernel smoothing
pub struct NoiseReductionPipeline {
    stages: Vec<Box<dyn Filter>>,
}

impl NoiseReductionPipeline {
    pub fn new(config: &NoiseReductionConfig) -> Self {
        Self {
            stages: vec![
                Box::new(MedianFilter::new(config.median_window)),
                Box::new(SmoothingFilter::new(config.smoothing_window)),
            ],
        }
    }

    /// Run every stage over the window in order
    pub fn process(&self, signal: &[f64]) -> Vec<f64> {
        self.apply(signal)
    }
}

impl Default for NoiseReductionPipeline {
    fn default() -> Self {
        Self::new(&NoiseReductionConfig::default())
    }
}

impl Filter for NoiseReductionPipeline {
    fn apply(&self, signal: &[f64]) -> Vec<f64> {
        self.stages
            .iter()
            .fold(signal.to_vec(), |window, stage| stage.apply(&window))
    }
}
