//! Error types for the image compressor.
//!
//! Provides a single error enum using `thiserror`, plus a serializable
//! [`ErrorKind`] so callers can react to the kind of failure without matching
//! on message text.

use std::io;
use std::path::PathBuf;
use serde::Serialize;
use thiserror::Error;

/// Shown when a failed task carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Compression failed";

/// The kind of a failure, independent of its user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The selection contained files, but none of them were images
    NoImagesSelected,
    /// Reading the bytes of a source file failed
    ReadFailure,
    /// The bytes could not be parsed as a raster image
    DecodeFailure,
    /// Re-encoding produced no output
    EncodeFailure,
    /// Quality outside of (0, 1]
    InvalidQuality,
    /// Configuration could not be loaded or is invalid
    Config,
    /// IO outside of a compression task (writing downloads, reading config)
    Io,
}

/// Main error type for the compressor.
///
/// `Validation` is global to a selection. `Read`, `Decode` and `Encode` are
/// local to a single compression task and never abort sibling tasks.
#[derive(Error, Debug, Serialize)]
pub enum CompressorError {
    /// Raw selection was non-empty but contained no images
    #[error("No image files were selected")]
    NoImagesSelected,

    /// Reading a source file failed
    #[error("Failed to read '{name}': {reason}")]
    Read { name: String, reason: String },

    /// Source bytes are not a decodable image
    #[error("Failed to decode '{name}': {reason}")]
    Decode { name: String, reason: String },

    /// The encoder returned nothing (or panicked)
    #[error("{0}")]
    Encode(String),

    /// Quality value outside of the accepted range
    #[error("Invalid quality value: {0}. Must be greater than 0 and at most 1")]
    Quality(f32),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// File IO error
    #[error("IO error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// Convenience result type for compressor operations.
pub type CompressorResult<T> = Result<T, CompressorError>;

impl CompressorError {
    pub fn read(name: impl Into<String>, err: impl ToString) -> Self {
        Self::Read { name: name.into(), reason: err.to_string() }
    }

    pub fn decode(name: impl Into<String>, err: impl ToString) -> Self {
        Self::Decode { name: name.into(), reason: err.to_string() }
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Io { path: path.into(), reason: err.to_string() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoImagesSelected => ErrorKind::NoImagesSelected,
            Self::Read { .. } => ErrorKind::ReadFailure,
            Self::Decode { .. } => ErrorKind::DecodeFailure,
            Self::Encode(_) => ErrorKind::EncodeFailure,
            Self::Quality(_) => ErrorKind::InvalidQuality,
            Self::Config(_) => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// User-facing message for a failed outcome, never empty.
    pub fn failure_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

// Convert serde_json errors raised while loading config
impl From<serde_json::Error> for CompressorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
