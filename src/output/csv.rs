use super::{Formatter, iso8601_timestamp};
use crate::result::PpgResult;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, result: &PpgResult) -> String {
        let ts = iso8601_timestamp();
        match result {
            PpgResult::Success(m) => format!(
                "{},success,{:.1},{:.1},{},{:.2},{:.1},{:.1},",
                ts, m.bpm, m.confidence, m.peak_count, m.signal_quality, m.hrv.rmssd, m.hrv.sdnn
            ),
            PpgResult::Insufficient { .. } => format!(
                "{},insufficient,,,,,,,{}%",
                ts,
                result.progress_percent().unwrap_or_default()
            ),
            PpgResult::Invalid { reason, confidence } => format!(
                "{},invalid,,{:.1},,,,,\"{}\"",
                ts,
                confidence,
                reason.replace('"', "'")
            ),
            PpgResult::Error { message } => {
                format!("{},error,,,,,,,\"{}\"", ts, message.replace('"', "'"))
            }
        }
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,status,bpm,confidence,peaks,quality,rmssd_ms,sdnn_ms,detail")
    }
}
