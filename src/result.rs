use serde::Serialize;

use crate::analysis::HrvMetrics;

/// A successful heart-rate measurement over one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// Heart rate in beats per minute
    pub bpm: f64,
    pub instantaneous_bpm: Vec<f64>,
    pub hrv: HrvMetrics,
    /// Composite confidence in `[0, 100]`
    pub confidence: f64,
    pub peak_count: usize,
    /// Peak validation quality in `[0, 1]`
    pub signal_quality: f64,
}

/// Outcome of one [`PpgProcessor::process`](crate::PpgProcessor::process) call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PpgResult {
    Success(Measurement),
    /// Buffer still filling
    Insufficient { progress: usize, required: usize },
    /// Window analyzed but rejected; `confidence` is in `[0, 100]`
    Invalid { reason: String, confidence: f64 },
    /// Window could not be analyzed
    Error { message: String },
}

impl PpgResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PpgResult::Success(_))
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            PpgResult::Success(m) => Some(m),
            _ => None,
        }
    }

    pub fn bpm(&self) -> Option<f64> {
        self.measurement().map(|m| m.bpm)
    }

    /// Confidence of a success or rejection, in `[0, 100]`
    pub fn confidence(&self) -> Option<f64> {
        match self {
            PpgResult::Success(m) => Some(m.confidence),
            PpgResult::Invalid { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }

    /// Buffer fill for `Insufficient`, as a percentage in `0..=100`
    pub fn progress_percent(&self) -> Option<u8> {
        match self {
            PpgResult::Insufficient { progress, required } => {
                if *required == 0 {
                    return Some(100);
                }
                Some((progress * 100 / required).min(100) as u8)
            }
            _ => None,
        }
    }

    /// Short lowercase name of the variant
    pub fn status(&self) -> &'static str {
        match self {
            PpgResult::Success(_) => "success",
            PpgResult::Insufficient { .. } => "insufficient",
            PpgResult::Invalid { .. } => "invalid",
            PpgResult::Error { .. } => "error",
        }
    }
}
