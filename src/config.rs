//! Configuration for the PPG pipeline and the measurement session.
//!
//! Every struct has a `Default` matching the reference tuning (30 Hz camera,
//! 10 s window, adaptive-percentile peaks) and can be partially overridden
//! from TOML; omitted keys keep their defaults.
//!
//! ```
//! use pulsecam::config::{PeakMethod, PpgConfig};
//!
//! let config = PpgConfig::from_toml_str("method = \"characteristic-wave\"").unwrap();
//! assert_eq!(config.method, PeakMethod::CharacteristicWave);
//! assert_eq!(config.window_size(), 300);
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PpgError, Result};
use crate::signal_processing::{DetrendMethod, FrequencyBand, NoiseReductionConfig};

/// Peak detection method
///
/// Each method also selects the band-pass preset applied before detection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PeakMethod {
    /// Two moving averages over the squared signal (0.5-8 Hz band)
    CharacteristicWave,
    /// Percentile threshold with prominence test (0.5-3.5 Hz band)
    #[default]
    AdaptivePercentile,
}

impl PeakMethod {
    /// Band-pass preset used with this method
    pub fn band(self) -> FrequencyBand {
        match self {
            PeakMethod::CharacteristicWave => FrequencyBand::new(0.5, 8.0),
            PeakMethod::AdaptivePercentile => FrequencyBand::new(0.5, 3.5),
        }
    }
}

impl fmt::Display for PeakMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakMethod::CharacteristicWave => write!(f, "characteristic-wave"),
            PeakMethod::AdaptivePercentile => write!(f, "adaptive-percentile"),
        }
    }
}

/// PPG processor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PpgConfig {
    /// Samples per second delivered by the producer
    pub sampling_rate: u32,
    /// Analysis window length in seconds
    pub window_seconds: u32,
    /// Peak detection method (and band-pass preset)
    pub method: PeakMethod,
    /// Per-frame averaging window applied before buffering
    pub temporal_window: usize,
    /// Raw-window variance below which the camera is considered static
    pub min_signal_variance: f64,
    /// Baseline model removed before band-pass filtering
    pub detrend: DetrendMethod,
    /// Median and smoothing stages
    pub noise: NoiseReductionConfig,
}

impl Default for PpgConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 30,
            window_seconds: 10,
            method: PeakMethod::default(),
            temporal_window: 3,
            min_signal_variance: 0.5,
            detrend: DetrendMethod::default(),
            noise: NoiseReductionConfig::default(),
        }
    }
}

impl PpgConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Buffer capacity in samples
    pub fn window_size(&self) -> usize {
        self.sampling_rate as usize * self.window_seconds as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.sampling_rate == 0 {
            return Err(PpgError::Config("sampling_rate must be positive".into()));
        }
        if self.window_seconds == 0 {
            return Err(PpgError::Config("window_seconds must be positive".into()));
        }
        if self.temporal_window == 0 {
            return Err(PpgError::Config("temporal_window must be positive".into()));
        }
        if self.noise.median_window == 0 {
            return Err(PpgError::Config("noise.median_window must be positive".into()));
        }
        if !self.min_signal_variance.is_finite() || self.min_signal_variance < 0.0 {
            return Err(PpgError::Config(format!(
                "min_signal_variance must be a non-negative number, got {}",
                self.min_signal_variance
            )));
        }
        let kernel = self.noise.smoothing_window.len();
        if self.window_size() < kernel {
            return Err(PpgError::Config(format!(
                "window of {} samples is shorter than the {}-sample smoothing kernel",
                self.window_size(),
                kernel
            )));
        }
        Ok(())
    }
}

/// Frame-driving policy around the processor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Run the pipeline once every this many ROI frames
    pub analyze_every_n_frames: u32,
    /// Consecutive frames without an ROI before the measurement restarts
    pub roi_lost_threshold: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            analyze_every_n_frames: 15,
            roi_lost_threshold: 15,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.analyze_every_n_frames == 0 {
            return Err(PpgError::Config(
                "analyze_every_n_frames must be positive".into(),
            ));
        }
        if self.roi_lost_threshold == 0 {
            return Err(PpgError::Config("roi_lost_threshold must be positive".into()));
        }
        Ok(())
    }
}
