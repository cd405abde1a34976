use crate::config::{PpgConfig, SessionConfig};
use crate::error::Result;
use crate::processing::PpgProcessor;
use crate::result::PpgResult;

/// Frame-by-frame driver around a [`PpgProcessor`]
///
/// Each camera frame either yields an ROI sample or not. Samples are fed to
/// the processor and the pipeline runs every `analyze_every_n_frames`
/// frames once the buffer is full. A run of `roi_lost_threshold` frames
/// without an ROI restarts the measurement from scratch.
pub struct MeasurementSession {
    processor: PpgProcessor,
    config: SessionConfig,
    frame_count: u64,
    missing_roi_frames: u32,
}

impl MeasurementSession {
    pub fn new(ppg_config: &PpgConfig, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            processor: PpgProcessor::new(ppg_config)?,
            config,
            frame_count: 0,
            missing_roi_frames: 0,
        })
    }

    /// Feed one frame; `None` means no region of interest was found
    ///
    /// Returns a result only on frames where the pipeline ran.
    pub fn push_frame(&mut self, sample: Option<f64>) -> Option<PpgResult> {
        let Some(value) = sample else {
            self.missing_roi_frames = self.missing_roi_frames.saturating_add(1);
            if self.missing_roi_frames >= self.config.roi_lost_threshold {
                if self.missing_roi_frames == self.config.roi_lost_threshold {
                    log::warn!(
                        "ROI lost for {} frames, restarting measurement",
                        self.missing_roi_frames
                    );
                }
                self.processor.reset();
                self.frame_count = 0;
            }
            return None;
        };

        self.missing_roi_frames = 0;
        self.processor.add_sample(value);
        self.frame_count += 1;

        if self.is_whole_second() {
            log::debug!(
                "session frame {}, buffer {}%",
                self.frame_count,
                self.processor.buffer_progress()
            );
        }

        if self.frame_count % self.config.analyze_every_n_frames as u64 == 0
            && self.processor.is_ready()
        {
            Some(self.processor.process())
        } else {
            None
        }
    }

    /// True on every frame that completes another second of samples
    fn is_whole_second(&self) -> bool {
        let frames_per_second = self.processor.config().sampling_rate.max(1) as u64;
        self.frame_count > 0 && self.frame_count % frames_per_second == 0
    }

    /// Buffer fill percentage
    pub fn progress(&self) -> u8 {
        self.processor.buffer_progress()
    }

    /// False once the ROI has been missing for at least one frame
    pub fn roi_present(&self) -> bool {
        self.missing_roi_frames == 0
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn processor(&self) -> &PpgProcessor {
        &self.processor
    }

    pub fn reset(&mut self) {
        self.processor.reset();
        self.frame_count = 0;
        self.missing_roi_frames = 0;
    }
}
