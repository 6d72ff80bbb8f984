//! Structured error types for tarmac-prof
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a run before any trace line is processed
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Cannot open symbol file {}", .path.display())]
    SymbolFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open trace file {}", .path.display())]
    TraceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open output file {}", .path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open coverage file {}", .path.display())]
    CoverageFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::SymbolFile {
            path: PathBuf::from("image.sym"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Cannot open symbol file image.sym");
    }

    #[test]
    fn test_setup_error_cause_reported_once() {
        let err = anyhow::Error::from(SetupError::TraceFile {
            path: PathBuf::from("run.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        });
        assert_eq!(format!("{err:#}"), "Cannot open trace file run.log: not found");
    }

    #[test]
    fn test_export_error_from_io() {
        let err: ExportError = std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full").into();
        assert!(err.to_string().contains("disk full"));
    }
}
