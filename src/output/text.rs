use super::Formatter;
use crate::result::PpgResult;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, result: &PpgResult) -> String {
        match result {
            PpgResult::Success(m) if self.verbose => format!(
                "HR: {:>5.1} BPM confidence: {:>5.1}% [peaks: {}, quality: {:.2}, RMSSD: {:.1} ms, SDNN: {:.1} ms, pNN50: {:.1}%]",
                m.bpm, m.confidence, m.peak_count, m.signal_quality, m.hrv.rmssd, m.hrv.sdnn, m.hrv.pnn50
            ),
            PpgResult::Success(m) => {
                format!("HR: {:>5.1} BPM confidence: {:>5.1}%", m.bpm, m.confidence)
            }
            PpgResult::Insufficient { .. } => format!(
                "Collecting: {:>3}%",
                result.progress_percent().unwrap_or_default()
            ),
            PpgResult::Invalid { reason, confidence } => {
                format!("Invalid: {} (confidence: {:.1}%)", reason, confidence)
            }
            PpgResult::Error { message } => format!("Error: {}", message),
        }
    }
}
