use serde::Serialize;

use super::{Formatter, iso8601_timestamp};
use crate::result::PpgResult;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    #[serde(flatten)]
    result: &'a PpgResult,
}

impl Formatter for JsonFormatter {
    fn format(&self, result: &PpgResult) -> String {
        let line = JsonLine {
            ts: iso8601_timestamp(),
            result,
        };
        serde_json::to_string(&line).unwrap_or_else(|e| {
            format!(
                r#"{{"ts":"{}","status":"error","message":"{}"}}"#,
                iso8601_timestamp(),
                e
            )
        })
    }
}
