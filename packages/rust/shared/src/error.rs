//! Error types for dmfinder.
//!
//! Library crates use [`DmfinderError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all dmfinder operations.
#[derive(Debug, thiserror::Error)]
pub enum DmfinderError {
    /// Configuration loading or validation error (including missing credentials).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to a provider or fetching a sheet.
    #[error("network error: {0}")]
    Network(String),

    /// Response body or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// LLM extraction error (API status, missing content).
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (missing columns, unsupported format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Spreadsheet decoding error (CSV or workbook).
    #[error("input error: {0}")]
    Input(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DmfinderError>;

impl DmfinderError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
