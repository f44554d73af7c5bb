//! Error types for PaperGraph.
//!
//! Library crates use [`PaperGraphError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Fault-handling policy: missing includes, inclusion cycles, and absent
//! sections are not errors at all — they degrade to empty/`None` values with
//! a recorded warning. The variants here cover the faults that do surface:
//! per-item embedding failures, phase-level store failures, and fatal
//! configuration problems.

use std::path::PathBuf;

/// Top-level error type for all PaperGraph operations.
#[derive(Debug, thiserror::Error)]
pub enum PaperGraphError {
    /// Configuration loading or validation error. Fatal before any work starts.
    #[error("config error: {message}")]
    Config { message: String },

    /// LaTeX source or document-structure error (no main file, no usable section).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Embedding collaborator unreachable or returned an unusable vector.
    /// Recovered at the batch-item granularity.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Graph store error. Aborts the storage phase and anything depending on it.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (dimension mismatch, invalid argument, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PaperGraphError>;

impl PaperGraphError {
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
