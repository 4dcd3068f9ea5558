//! Typed error handling for prgscan.
//!
//! Errors fall into two groups: fatal ones that abort a scan (directory
//! traversal, report output) and per-file read failures that the pipeline
//! logs and skips.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for prgscan operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The root is missing or a directory could not be enumerated.
    #[error("Traversal error at {path}: {message}")]
    Traversal {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<walkdir::Error>,
    },

    /// I/O error when reading a single source file
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// The report could not be created or written.
    #[error("Report error at {path}: {message}")]
    Report {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScanError {
    /// Create a traversal error from a walkdir failure.
    pub fn traversal(root: impl Into<PathBuf>, err: walkdir::Error) -> Self {
        // Prefer the path walkdir failed on; fall back to the scan root.
        let path = err
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| root.into());
        Self::Traversal {
            path,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a report error from a failed write.
    pub fn report(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Report {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenience type alias for prgscan results.
pub type ScanResult<T> = Result<T, ScanError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> ScanResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ScanResult<T> {
        self.map_err(|e| ScanError::io(path, e))
    }
}
