use crate::analysis::{HeartRateCalculator, HeartRateMetrics, HrvAnalyzer, HrvMetrics};
use crate::config::{PeakMethod, PpgConfig};
use crate::constants::{MAX_VALID_BPM, MIN_VALID_BPM};
use crate::error::{PpgError, Result};
use crate::peaks::{PeakDetector, PeakValidation, PeakValidator, create_detector};
use crate::result::{Measurement, PpgResult};
use crate::signal_processing::math::variance;
use crate::signal_processing::{
    BandpassFilter, NoiseReductionPipeline, SignalBuffer, SignalDetrend, TemporalAverageFilter,
};

/// Confidence reported when peaks validate but no heart rate can be derived
const UNDETERMINED_HR_CONFIDENCE: f64 = 30.0;

/// Streaming PPG processor
///
/// Samples are pushed one per frame with [`add_sample`](Self::add_sample);
/// [`process`](Self::process) analyzes the most recent full window. The
/// processor is not internally synchronized: callers drive it from a single
/// thread.
pub struct PpgProcessor {
    config: PpgConfig,
    buffer: SignalBuffer,
    temporal_filter: TemporalAverageFilter,
    noise_reduction: NoiseReductionPipeline,
    bandpass: BandpassFilter,
    detector: Box<dyn PeakDetector>,
    validator: PeakValidator,
    hr_calculator: HeartRateCalculator,
    hrv_analyzer: HrvAnalyzer,
    frame_count: u64,
    last_valid_bpm: Option<f64>,
    consecutive_failures: u32,
}

impl PpgProcessor {
    pub fn new(config: &PpgConfig) -> Result<Self> {
        config.validate()?;
        let sampling_rate = config.sampling_rate;

        Ok(Self {
            config: config.clone(),
            buffer: SignalBuffer::new(config.window_size()),
            temporal_filter: TemporalAverageFilter::new(config.temporal_window),
            noise_reduction: NoiseReductionPipeline::new(&config.noise),
            bandpass: BandpassFilter::new(sampling_rate as f64, config.method.band())?,
            detector: create_detector(config.method, sampling_rate),
            validator: PeakValidator::new(sampling_rate),
            hr_calculator: HeartRateCalculator::new(sampling_rate),
            hrv_analyzer: HrvAnalyzer::new(sampling_rate),
            frame_count: 0,
            last_valid_bpm: None,
            consecutive_failures: 0,
        })
    }

    /// Processor with the default 30 Hz, 10 s, adaptive-percentile setup
    pub fn with_defaults() -> Result<Self> {
        Self::new(&PpgConfig::default())
    }

    /// Push one raw frame value (mean green intensity over the ROI)
    pub fn add_sample(&mut self, value: f64) {
        let smoothed = self.temporal_filter.add_and_get(value);
        self.buffer.add(smoothed);
        self.frame_count += 1;
    }

    /// Analyze the current window
    ///
    /// Never fails: pipeline errors are reported as [`PpgResult::Error`].
    pub fn process(&mut self) -> PpgResult {
        if !self.buffer.is_full() {
            return PpgResult::Insufficient {
                progress: self.buffer.len(),
                required: self.buffer.capacity(),
            };
        }

        let result = match self.analyze_window() {
            Ok(result) => result,
            Err(e) => {
                log::warn!("PPG window analysis failed: {}", e);
                self.consecutive_failures += 1;
                PpgResult::Error {
                    message: e.to_string(),
                }
            }
        };

        match &result {
            PpgResult::Success(m) => log::debug!(
                "frame {}: {:.1} BPM, confidence {:.1}, {} peaks",
                self.frame_count,
                m.bpm,
                m.confidence,
                m.peak_count
            ),
            PpgResult::Invalid { reason, confidence } => log::debug!(
                "frame {}: rejected ({}), confidence {:.1}, {} consecutive failures",
                self.frame_count,
                reason,
                confidence,
                self.consecutive_failures
            ),
            _ => {}
        }
        result
    }

    fn analyze_window(&mut self) -> Result<PpgResult> {
        let raw = self.buffer.to_vec();
        if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
            return Err(PpgError::NonFiniteSample { index });
        }

        let signal_variance = variance(&raw);
        log::trace!("window variance {:.4}", signal_variance);
        if signal_variance < self.config.min_signal_variance {
            self.consecutive_failures += 1;
            return Ok(PpgResult::Invalid {
                reason: "Static signal detected - no blood flow variation".to_string(),
                confidence: 0.0,
            });
        }

        let cleaned = self.clean(&raw);
        let peaks = self.detector.find_peaks(&cleaned);
        let validation = self.validator.validate(&peaks, &cleaned);
        if !validation.is_valid {
            self.consecutive_failures += 1;
            return Ok(PpgResult::Invalid {
                reason: validation.reason,
                confidence: validation.confidence * 100.0,
            });
        }

        let heart_rate = self.hr_calculator.calculate(&peaks);
        if !heart_rate.is_valid() {
            self.consecutive_failures += 1;
            return Ok(PpgResult::Invalid {
                reason: "Could not calculate heart rate".to_string(),
                confidence: UNDETERMINED_HR_CONFIDENCE,
            });
        }

        let hrv = self.hrv_analyzer.analyze(&peaks);
        let confidence = self.confidence(&heart_rate, &hrv, &validation);

        if !(MIN_VALID_BPM..=MAX_VALID_BPM).contains(&heart_rate.mean_bpm) {
            return Ok(PpgResult::Invalid {
                reason: format!("BPM out of range: {}", heart_rate.mean_bpm as i64),
                confidence,
            });
        }

        self.consecutive_failures = 0;
        self.last_valid_bpm = Some(heart_rate.mean_bpm);

        Ok(PpgResult::Success(Measurement {
            bpm: heart_rate.mean_bpm,
            instantaneous_bpm: heart_rate.instantaneous_bpm,
            hrv,
            confidence,
            peak_count: peaks.len(),
            signal_quality: validation.quality,
        }))
    }

    /// Noise reduction, baseline removal, then band-pass
    fn clean(&mut self, raw: &[f64]) -> Vec<f64> {
        let denoised = self.noise_reduction.process(raw);
        let detrended = SignalDetrend::remove(&denoised, self.config.detrend);
        self.bandpass.apply(&detrended)
    }

    /// Composite confidence in `[0, 100]`
    ///
    /// Starts at 100 and is scaled by validation quality, BPM stability,
    /// RMSSD plausibility, agreement with the last accepted reading and
    /// finally a penalty for recent failures.
    fn confidence(
        &self,
        heart_rate: &HeartRateMetrics,
        hrv: &HrvMetrics,
        validation: &PeakValidation,
    ) -> f64 {
        let mut confidence = 100.0;

        confidence *= validation.quality * 0.4 + 0.6;

        let cv = if heart_rate.mean_bpm > 0.0 {
            heart_rate.std_dev / heart_rate.mean_bpm
        } else {
            1.0
        };
        let stability = (1.0 - cv * 2.0).max(0.0);
        confidence *= stability * 0.3 + 0.7;

        let hrv_score = if (5.0..=150.0).contains(&hrv.rmssd) {
            1.0
        } else {
            0.5
        };
        confidence *= hrv_score * 0.2 + 0.8;

        if let Some(last) = self.last_valid_bpm {
            let consistency = (1.0 - (heart_rate.mean_bpm - last).abs() / 30.0).max(0.0);
            confidence *= consistency * 0.1 + 0.9;
        }

        if self.consecutive_failures > 0 {
            confidence *= (1.0 - self.consecutive_failures as f64 * 0.1).max(0.5);
        }

        confidence.clamp(0.0, 100.0)
    }

    /// Discard all buffered samples and history
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.temporal_filter.reset();
        self.frame_count = 0;
        self.consecutive_failures = 0;
        self.last_valid_bpm = None;
    }

    /// Buffer fill as a percentage in `0..=100`
    pub fn buffer_progress(&self) -> u8 {
        (self.buffer.len() * 100 / self.buffer.capacity()).min(100) as u8
    }

    pub fn is_ready(&self) -> bool {
        self.buffer.is_full()
    }

    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    pub fn config(&self) -> &PpgConfig {
        &self.config
    }

    pub fn method(&self) -> PeakMethod {
        self.detector.method()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_valid_bpm(&self) -> Option<f64> {
        self.last_valid_bpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn pulse_sample(i: usize, bpm: f64) -> f64 {
        let theta = 2.0 * PI * bpm / 60.0 * i as f64 / 30.0;
        120.0
            + 4.0
                * (theta.sin()
                    + 0.5 * (2.0 * theta - 0.6).sin()
                    + 0.2 * (3.0 * theta - 1.2).sin())
    }

    fn feed(processor: &mut PpgProcessor, bpm: f64, count: usize) {
        for i in 0..count {
            processor.add_sample(pulse_sample(i, bpm));
        }
    }

    #[test]
    fn test_insufficient_until_full() {
        let mut processor = PpgProcessor::with_defaults().unwrap();
        assert_eq!(processor.buffer_progress(), 0);
        feed(&mut processor, 72.0, 150);
        assert_eq!(processor.buffer_progress(), 50);
        assert!(!processor.is_ready());
        assert_eq!(
            processor.process(),
            PpgResult::Insufficient {
                progress: 150,
                required: 300
            }
        );
        feed(&mut processor, 72.0, 150);
        assert!(processor.is_ready());
        assert_eq!(processor.buffer_progress(), 100);
    }

    #[test]
    fn test_static_signal_counts_as_failure() {
        let mut processor = PpgProcessor::with_defaults().unwrap();
        for _ in 0..300 {
            processor.add_sample(128.0);
        }
        match processor.process() {
            PpgResult::Invalid { reason, confidence } => {
                assert!(reason.starts_with("Static signal"), "{}", reason);
                assert_eq!(confidence, 0.0);
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert_eq!(processor.consecutive_failures(), 1);
    }

    #[test]
    fn test_success_resets_failures() {
        let mut processor = PpgProcessor::with_defaults().unwrap();
        for _ in 0..300 {
            processor.add_sample(128.0);
        }
        processor.process();
        processor.process();
        assert_eq!(processor.consecutive_failures(), 2);

        // Two extra frames flush the static values out of the temporal filter
        feed(&mut processor, 72.0, 302);
        let result = processor.process();
        let bpm = result.bpm().expect("pulse window should succeed");
        assert!((bpm - 72.0).abs() < 2.0, "BPM {}", bpm);
        assert_eq!(processor.consecutive_failures(), 0);
        assert_eq!(processor.last_valid_bpm(), Some(bpm));
    }

    #[test]
    fn test_failure_penalty_lowers_confidence() {
        let mut clean = PpgProcessor::with_defaults().unwrap();
        feed(&mut clean, 72.0, 302);
        let clean_confidence = clean.process().confidence().unwrap();

        let mut penalized = PpgProcessor::with_defaults().unwrap();
        for _ in 0..300 {
            penalized.add_sample(128.0);
        }
        for _ in 0..3 {
            penalized.process();
        }
        feed(&mut penalized, 72.0, 302);
        let penalized_confidence = penalized.process().confidence().unwrap();

        assert!(
            (penalized_confidence - clean_confidence * 0.7).abs() < 1e-6,
            "{} vs {}",
            penalized_confidence,
            clean_confidence
        );
    }

    fn heart_rate(mean_bpm: f64, std_dev: f64) -> HeartRateMetrics {
        HeartRateMetrics {
            mean_bpm,
            min_bpm: mean_bpm - std_dev,
            max_bpm: mean_bpm + std_dev,
            std_dev,
            instantaneous_bpm: vec![mean_bpm - std_dev, mean_bpm + std_dev],
        }
    }

    fn hrv_with_rmssd(rmssd: f64) -> HrvMetrics {
        HrvMetrics {
            rmssd,
            ..HrvMetrics::default()
        }
    }

    fn valid_with_quality(quality: f64) -> PeakValidation {
        PeakValidation {
            is_valid: true,
            reason: "Valid".to_string(),
            confidence: quality,
            quality,
        }
    }

    #[test]
    fn test_confidence_factors() {
        let mut processor = PpgProcessor::with_defaults().unwrap();

        // Perfect window apart from an implausible RMSSD
        let c = processor.confidence(
            &heart_rate(60.0, 0.0),
            &hrv_with_rmssd(200.0),
            &valid_with_quality(1.0),
        );
        assert!((c - 90.0).abs() < 1e-9, "{}", c);

        let c = processor.confidence(
            &heart_rate(60.0, 0.0),
            &hrv_with_rmssd(3.0),
            &valid_with_quality(1.0),
        );
        assert!((c - 90.0).abs() < 1e-9, "{}", c);

        // quality 0.5 -> 0.8, cv 0.1 -> 0.94, RMSSD in range -> 1.0
        let c = processor.confidence(
            &heart_rate(60.0, 6.0),
            &hrv_with_rmssd(40.0),
            &valid_with_quality(0.5),
        );
        assert!((c - 100.0 * 0.8 * 0.94).abs() < 1e-9, "{}", c);

        // 10 BPM away from the last reading -> 0.9 + 0.1 * 2/3
        processor.last_valid_bpm = Some(70.0);
        let c = processor.confidence(
            &heart_rate(60.0, 6.0),
            &hrv_with_rmssd(40.0),
            &valid_with_quality(0.5),
        );
        let expected = 100.0 * 0.8 * 0.94 * (0.9 + 0.1 * (2.0 / 3.0));
        assert!((c - expected).abs() < 1e-9, "{} vs {}", c, expected);

        // More than 30 BPM away bottoms out at 0.9
        processor.last_valid_bpm = Some(100.0);
        let c = processor.confidence(
            &heart_rate(60.0, 0.0),
            &hrv_with_rmssd(40.0),
            &valid_with_quality(1.0),
        );
        assert!((c - 90.0).abs() < 1e-9, "{}", c);

        // Very unstable rate: stability term drops to its 0.7 floor
        processor.last_valid_bpm = None;
        let c = processor.confidence(
            &heart_rate(60.0, 40.0),
            &hrv_with_rmssd(40.0),
            &valid_with_quality(1.0),
        );
        assert!((c - 70.0).abs() < 1e-9, "{}", c);
    }

    #[test]
    fn test_failure_penalty_floor() {
        let mut processor = PpgProcessor::with_defaults().unwrap();
        let hr = heart_rate(60.0, 0.0);
        let hrv = hrv_with_rmssd(40.0);
        let validation = valid_with_quality(1.0);

        processor.consecutive_failures = 3;
        let c = processor.confidence(&hr, &hrv, &validation);
        assert!((c - 70.0).abs() < 1e-9, "{}", c);

        processor.consecutive_failures = 9;
        let c = processor.confidence(&hr, &hrv, &validation);
        assert!((c - 50.0).abs() < 1e-9, "{}", c);
    }

    #[test]
    fn test_second_window_confidence_matches_formula() {
        let mut processor = PpgProcessor::with_defaults().unwrap();
        feed(&mut processor, 72.0, 302);
        let last = processor.process().bpm().expect("72 BPM window");

        feed(&mut processor, 78.0, 302);
        let result = processor.process();
        let m = result.measurement().expect("78 BPM window");
        assert!((m.bpm - last).abs() > 3.0, "{} vs {}", m.bpm, last);

        let n = m.instantaneous_bpm.len() as f64;
        let variance = m
            .instantaneous_bpm
            .iter()
            .map(|b| (b - m.bpm).powi(2))
            .sum::<f64>()
            / n;
        let cv = variance.sqrt() / m.bpm;
        let rmssd_score = if (5.0..=150.0).contains(&m.hrv.rmssd) {
            1.0
        } else {
            0.5
        };
        let expected = 100.0
            * (m.signal_quality * 0.4 + 0.6)
            * ((1.0 - cv * 2.0).max(0.0) * 0.3 + 0.7)
            * (rmssd_score * 0.2 + 0.8)
            * ((1.0 - (m.bpm - last).abs() / 30.0).max(0.0) * 0.1 + 0.9);

        assert!(
            (m.confidence - expected).abs() < 1e-9,
            "{} vs {}",
            m.confidence,
            expected
        );
        assert_eq!(processor.last_valid_bpm(), Some(m.bpm));
    }

    #[test]
    fn test_too_slow_pulse_cannot_give_heart_rate() {
        let config = PpgConfig {
            method: PeakMethod::CharacteristicWave,
            ..PpgConfig::default()
        };
        let mut processor = PpgProcessor::new(&config).unwrap();
        // 24 BPM: peaks validate but every interval exceeds the RR limit
        for i in 0..300 {
            let theta = 2.0 * PI * 0.4 * i as f64 / 30.0;
            processor.add_sample(120.0 + 4.0 * theta.sin());
        }

        assert_eq!(
            processor.process(),
            PpgResult::Invalid {
                reason: "Could not calculate heart rate".to_string(),
                confidence: 30.0,
            }
        );
        assert_eq!(processor.consecutive_failures(), 1);
        assert_eq!(processor.last_valid_bpm(), None);
    }

    #[test]
    fn test_non_finite_sample_reported_as_error() {
        let mut processor = PpgProcessor::with_defaults().unwrap();
        feed(&mut processor, 72.0, 299);
        processor.add_sample(f64::NAN);
        match processor.process() {
            PpgResult::Error { message } => assert!(message.contains("Non-finite"), "{}", message),
            other => panic!("expected Error, got {:?}", other),
        }
        assert_eq!(processor.consecutive_failures(), 1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut processor = PpgProcessor::with_defaults().unwrap();
        feed(&mut processor, 72.0, 320);
        processor.process();
        processor.reset();
        assert_eq!(processor.frame_count(), 0);
        assert_eq!(processor.buffer_progress(), 0);
        assert_eq!(processor.last_valid_bpm(), None);
        assert_eq!(processor.consecutive_failures(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PpgConfig {
            sampling_rate: 0,
            ..PpgConfig::default()
        };
        assert!(PpgProcessor::new(&config).is_err());

        // 8 Hz upper edge is above Nyquist at 12 Hz sampling
        let config = PpgConfig {
            sampling_rate: 12,
            method: PeakMethod::CharacteristicWave,
            ..PpgConfig::default()
        };
        assert!(matches!(
            PpgProcessor::new(&config),
            Err(PpgError::FilterDesign(_))
        ));
    }
}
