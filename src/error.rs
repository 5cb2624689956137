//! Error types for rageshake
//!
//! This module groups failures by the part of the pipeline that produced them:
//! - Report building (log collection, compression)
//! - Remote submission (missing endpoint, HTTP status, transport, timeout)
//! - Local archive assembly and delivery
//! - Avatar upload and apply
//!
//! Degraded metadata probes never produce an error; they are recorded as
//! `UNKNOWN` or omitted by the builder.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for rageshake operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rageshake
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "submit_timeout")
        key: Option<String>,
    },

    /// The log source failed to produce log segments
    #[error("failed to collect logs: {0}")]
    LogSource(String),

    /// Compressing or decompressing a log segment failed
    #[error("compression error: {0}")]
    Compression(#[source] std::io::Error),

    /// Remote submission failed
    #[error("{0}")]
    Submit(#[from] SubmitError),

    /// Local archive assembly or delivery failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Avatar upload or apply failed
    #[error("avatar error: {0}")]
    Avatar(#[from] AvatarError),

    /// Report dispatch state machine was driven out of order
    #[error("cannot {action} while report is {state}")]
    InvalidState {
        /// The attempted transition
        action: String,
        /// The state the dispatch was in
        state: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Probe or operation not available on this platform
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Remote submission errors
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No endpoint was configured, nothing was sent
    #[error("No bug report endpoint has been set.")]
    NoEndpoint,

    /// The endpoint could not be parsed as a URL
    #[error("invalid bug report endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// The endpoint as given by the caller
        endpoint: String,
        /// Why parsing failed
        reason: String,
    },

    /// The server answered with a status outside `[200, 400)`
    #[error("HTTP {status}")]
    HttpStatus {
        /// Numeric HTTP status code
        status: u16,
    },

    /// The request did not complete within the submit timeout
    #[error("bug report submission timed out after {after:?}")]
    TimedOut {
        /// The timeout that elapsed
        after: Duration,
    },

    /// Connection, TLS, or body encoding failure
    #[error("failed to send bug report: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Local archive errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A compressed log could not be expanded
    #[error("failed to decompress {file_name}: {source}")]
    Decompress {
        /// File name the log was attached under
        file_name: String,
        /// Underlying decoder error
        #[source]
        source: std::io::Error,
    },

    /// Writing a tar entry failed
    #[error("failed to append {entry} to archive: {source}")]
    Append {
        /// Archive entry name
        entry: String,
        /// Underlying tar error
        #[source]
        source: std::io::Error,
    },

    /// Target file exists and collision action is Skip
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The conflicting path
        path: PathBuf,
        /// Description of the collision
        reason: String,
    },

    /// Target path could not be used
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path
        path: PathBuf,
        /// Why the path is unusable
        reason: String,
    },

    /// A blocking archive task panicked or was cancelled
    #[error("archive task failed: {0}")]
    Task(String),
}

/// Avatar upload and apply errors
#[derive(Debug, Error)]
pub enum AvatarError {
    /// The selected file is not an image
    #[error("{file_name} is not an image (content type {content_type})")]
    NotAnImage {
        /// Name of the selected file
        file_name: String,
        /// Content type reported for the file
        content_type: String,
    },

    /// Uploading to the media repository failed
    #[error("upload failed: {source}")]
    Upload {
        /// Error returned by the media repository
        #[source]
        source: Box<Error>,
    },

    /// Applying the uploaded content as an avatar failed
    #[error("failed to set avatar: {source}")]
    Apply {
        /// Error returned while updating the room or profile
        #[source]
        source: Box<Error>,
    },
}

impl SubmitError {
    /// Numeric HTTP status carried by this failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::HttpStatus { status } => Some(*status),
            SubmitError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
