use thiserror::Error;

/// Result type for convoscope-parser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the parser's I/O helpers.
///
/// A line that fails to decode is not an error; see [`crate::LineOutcome`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
