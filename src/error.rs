//! Error types for ROM ingestion.
//!
//! This module provides the error hierarchy using `thiserror` for reading
//! files, resolving the processing module, and running CLI commands.
//! Ingestion itself has a single error kind, [`ReadFailure`]; its
//! [`FailureReason`] keeps the underlying cause instead of flattening it.

use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a selected file failed.
    #[error(transparent)]
    Read(#[from] ReadFailure),

    /// I/O errors outside of a read (stat, path handling).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The processing module failed to resolve or rejected the buffer.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// The single failure kind of an ingestion.
///
/// Every platform-reported error, abort, and cancellation ends up here.
#[derive(Error, Debug)]
#[error("failed to read {name}: {reason}")]
pub struct ReadFailure {
    /// Name of the file being read.
    pub name: String,
    /// What went wrong.
    #[source]
    pub reason: FailureReason,
}

impl ReadFailure {
    /// Creates a failure for the named file.
    #[must_use]
    pub fn new(name: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            name: name.into(),
            reason,
        }
    }

    /// Returns true if the failure came from a caller cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.reason, FailureReason::Cancelled)
    }
}

/// Cause of a [`ReadFailure`].
#[derive(Error, Debug)]
pub enum FailureReason {
    /// The platform reported an I/O error.
    #[error("{0}")]
    Platform(#[source] std::io::Error),

    /// The platform dropped the read without completing it.
    #[error("read aborted")]
    Aborted,

    /// The caller cancelled the read.
    #[error("read cancelled")]
    Cancelled,

    /// The content length does not match the size reported at selection.
    #[error("size mismatch: expected {expected} bytes, read {actual} bytes")]
    SizeMismatch {
        /// Size declared by the handle.
        expected: u64,
        /// Bytes actually delivered. A file that grew is read only one
        /// byte past the expected size.
        actual: u64,
    },

    /// The file exceeds the configured maximum.
    #[error("file too large: {size} bytes (max: {max} bytes)")]
    TooLarge {
        /// Declared file size.
        size: u64,
        /// Configured maximum.
        max: u64,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to inspect the file.
    #[error("failed to stat file: {path}: {reason}")]
    StatFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Path does not name a regular file.
    #[error("not a regular file: {path}")]
    NotAFile {
        /// Offending path.
        path: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// Errors raised while resolving or feeding the processing module.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The module could not be resolved.
    #[error("module unavailable: {0}")]
    ModuleUnavailable(String),

    /// The buffer is not a ROM image the module understands.
    #[error("invalid ROM header: {reason}")]
    InvalidHeader {
        /// Why the header was rejected.
        reason: String,
    },

    /// The image is shorter than its header claims.
    #[error("truncated ROM: header declares {expected} bytes, image has {actual}")]
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}
