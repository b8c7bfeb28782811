use crate::Result;
use crate::line::{LineOutcome, parse_line};
use convoscope_types::Record;
use serde::Serialize;
use std::path::Path;

/// Line accounting for one pass over a log.
///
/// Invariant: `accepted + skipped + blank == total_lines`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub total_lines: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub blank: usize,
}

impl ParseStats {
    pub fn observe(&mut self, outcome: &LineOutcome) {
        self.total_lines += 1;
        match outcome {
            LineOutcome::Record(_) => self.accepted += 1,
            LineOutcome::Blank => self.blank += 1,
            LineOutcome::Rejected(_) => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub records: Vec<Record>,
    pub stats: ParseStats,
}

/// Decode a whole log in one go (no batching, no yielding).
pub fn parse_text(text: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for (line_no, line) in text.lines().enumerate() {
        let outcome = parse_line(line);
        parsed.stats.observe(&outcome);

        match outcome {
            LineOutcome::Record(record) => parsed.records.push(record),
            LineOutcome::Rejected(reason) => {
                tracing::trace!(line = line_no + 1, %reason, "skipping line");
            }
            LineOutcome::Blank => {}
        }
    }

    parsed
}

/// Read and decode a log file.
pub fn parse_file(path: &Path) -> Result<ParsedLog> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_text(&text))
}
