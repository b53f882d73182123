//! Error taxonomy for scanning and exporting.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Source file missing, unreadable, or not UTF-8.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Something went wrong inside one of the scanners.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Writing one output format failed.
    #[error("{format} export to {} failed: {message}", path.display())]
    Export {
        format: String,
        path: PathBuf,
        message: String,
    },

    /// Invalid batch configuration.
    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// An input path that does not exist.
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The scan was stopped through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
