//! Error types for boot images
//!
//! This module provides error types for buffer access, image registration,
//! format probing and script execution.

use std::ffi::CString;
use thiserror::Error;

/// Status returned by a successful command or image
pub const STATUS_OK: i32 = 0;

/// Status reported when a script cannot be read from its buffer
pub const STATUS_IO_ERROR: i32 = 5;

/// Status reported when an image cannot be executed at all
pub const STATUS_NOT_EXECUTABLE: i32 = 8;

/// Status reported when an image is asked to execute while already running
pub const STATUS_BUSY: i32 = 16;

/// Error type for image operations
#[derive(Debug, Error)]
pub enum ImageError {
    /// Buffer does not match this image type's signature
    #[error("not a recognised {0} image")]
    FormatMismatch(&'static str),

    /// No registered image type recognised the buffer
    #[error("unknown image format: {0}")]
    UnknownFormat(String),

    /// Image has already been classified
    #[error("image '{name}' is already classified as {image_type}")]
    AlreadyClassified {
        name: String,
        image_type: &'static str,
    },

    /// Image has not been classified by any image type
    #[error("image '{0}' is not executable")]
    NotExecutable(String),

    /// Read outside the image buffer
    #[error("read of {len} bytes at offset {offset} exceeds buffer length {buffer_len}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    /// Image is already present in the registry
    #[error("image '{0}' is already registered")]
    AlreadyRegistered(String),

    /// Image is not present in the registry
    #[error("image '{0}' is not registered")]
    NotRegistered(String),
}

/// Result type for image operations
pub type Result<T> = std::result::Result<T, ImageError>;

/// Reason a script stopped before its last line
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A command reported a non-zero status
    #[error("command {command:?} failed with status {status}")]
    CommandFailed { command: CString, status: i32 },

    /// The script is already executing further up the call chain
    #[error("script '{0}' is already running")]
    AlreadyRunning(String),

    /// The script could not be read from its buffer
    #[error("failed to read script: {0}")]
    Buffer(#[from] ImageError),
}

impl ScriptError {
    /// Status code reported to whoever executed the script
    pub fn status(&self) -> i32 {
        match self {
            ScriptError::CommandFailed { status, .. } => *status,
            ScriptError::AlreadyRunning(_) => STATUS_BUSY,
            ScriptError::Buffer(_) => STATUS_IO_ERROR,
        }
    }
}
