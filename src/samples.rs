//! Plain-text sample streams: one frame per line
//!
//! A line holds either a finite number (the ROI mean intensity for that
//! frame) or a marker for a frame with no ROI: an empty line, `-`, or
//! `nan`. Lines starting with `#` are comments and do not count as frames.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{PpgError, Result};

/// Parse one line; `None` for comments, `Some(None)` for a missing-ROI frame
pub fn parse_sample_line(line: &str) -> Result<Option<Option<f64>>> {
    let line = line.trim();
    if line.starts_with('#') {
        return Ok(None);
    }
    if line.is_empty() || line == "-" || line.eq_ignore_ascii_case("nan") {
        return Ok(Some(None));
    }
    line.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| Some(Some(v)))
        .ok_or_else(|| PpgError::InvalidSample(line.to_string()))
}

/// Read every frame from a sample file
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<Option<f64>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();
    for line in reader.lines() {
        if let Some(frame) = parse_sample_line(&line?)? {
            frames.push(frame);
        }
    }
    Ok(frames)
}

/// Write frames, one per line, with an optional leading comment
pub fn save_samples(
    path: impl AsRef<Path>,
    frames: &[Option<f64>],
    comment: Option<&str>,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    if let Some(comment) = comment {
        writeln!(writer, "# {}", comment)?;
    }
    for frame in frames {
        match frame {
            Some(v) => writeln!(writer, "{:.6}", v)?,
            None => writeln!(writer, "-")?,
        }
    }
    writer.flush()?;
    Ok(())
}
