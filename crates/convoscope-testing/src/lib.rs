//! Testing infrastructure for convoscope tests.
//!
//! - `lines`: builders for individual log lines
//! - `fixtures`: ready-made session logs and temp-file placement

pub mod fixtures;
pub mod lines;

pub use lines::LineBuilder;
