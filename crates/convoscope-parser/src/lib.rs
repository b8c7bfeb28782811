// Error types
pub mod error;

// Single-line decoding
pub mod line;

// Whole-log helpers
pub mod io;

pub use error::{Error, Result};
pub use io::{ParseStats, ParsedLog, parse_file, parse_text};
pub use line::{LineOutcome, RejectReason, parse_line};
