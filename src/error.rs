//! Centralized error types for mailtriage.
//!
//! Only ingestion and export can fail. The triage pipeline itself degrades to
//! empty extractions instead of returning errors.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailtriage library.
#[derive(Error, Debug)]
pub enum TriageError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified input file or directory does not exist.
    #[error("Input not found: {0}")]
    FileNotFound(PathBuf),

    /// The CSV input could not be tokenized.
    #[error("Malformed CSV at line {line}: {reason}")]
    InvalidCsv { line: usize, reason: String },

    /// The input contained no header row or no messages at all.
    #[error("No records found in '{0}'")]
    EmptyInput(PathBuf),

    /// An export operation failed.
    #[error("Export error: {0}")]
    ExportError(String),

    /// An invalid path was provided.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for `Result<T, TriageError>`.
pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// `NotFound` is mapped to [`TriageError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (prefer `TriageError::io`).
impl From<std::io::Error> for TriageError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let err = TriageError::io(
            "missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, TriageError::FileNotFound(ref p) if p == &PathBuf::from("missing.csv")));
    }

    #[test]
    fn test_invalid_csv_message() {
        let err = TriageError::InvalidCsv {
            line: 4,
            reason: "unterminated quoted field".into(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed CSV at line 4: unterminated quoted field"
        );
    }
}
