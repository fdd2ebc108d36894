//! Error types for the response store
//!
//! Provides error handling for:
//! - Load operations (file → responses), recoverable by the caller
//! - Write operations (responses → file), surfaced to the operator
//! - Export operations (responses → delimited or text file)

use std::path::PathBuf;

/// Errors while persisting the response list
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error during file write
    #[error("failed to write responses to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Response list could not be encoded
    #[error("failed to encode responses: {0}")]
    Encode(#[from] serde_json::Error),

    /// Position outside the stored list
    #[error("response index {index} out of range (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl StoreError {
    /// Create write error for path
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Errors while reading the response list
///
/// Never fatal: the store degrades to an empty list and logs the cause.
#[derive(Debug, thiserror::Error)]
pub enum StoreLoadError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a JSON list of responses
    #[error("malformed response file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Nothing to export
    #[error("no responses to export")]
    NoResponses,

    /// IO error during file write
    #[error("error exporting to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_names_path() {
        let err = StoreError::write_error(
            "/tmp/responses.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/responses.json"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn index_error_display() {
        let err = StoreError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "response index 4 out of range (store holds 2)");
    }

    #[test]
    fn export_error_display() {
        assert_eq!(ExportError::NoResponses.to_string(), "no responses to export");
    }
}
