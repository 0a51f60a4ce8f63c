//! Error types for shell commands

use netboot_image::{ImageError, STATUS_IO_ERROR, STATUS_NOT_EXECUTABLE};
use thiserror::Error;

/// Status of a command that failed for a generic reason
pub const STATUS_FAILURE: i32 = 1;

/// Status of a command whose target does not exist
pub const STATUS_NOT_FOUND: i32 = 2;

/// Status of a line naming no known command
pub const STATUS_UNKNOWN_COMMAND: i32 = 127;

/// Error type for shell commands
#[derive(Debug, Error)]
pub enum ShellError {
    /// Command name not recognised
    #[error("{0}: command not found")]
    UnknownCommand(String),

    /// Command arguments are malformed
    #[error("{command}: {reason}")]
    InvalidArgument {
        command: &'static str,
        reason: String,
    },

    /// No registered image has the given name
    #[error("no such image: {0}")]
    ImageNotFound(String),

    /// No registered image can be executed
    #[error("no executable image")]
    NoExecutableImage,

    /// Image layer error
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Writing command output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for shell commands
pub type Result<T> = std::result::Result<T, ShellError>;

impl ShellError {
    /// Status the failing command reports to its caller
    pub fn status(&self) -> i32 {
        match self {
            ShellError::UnknownCommand(_) => STATUS_UNKNOWN_COMMAND,
            ShellError::InvalidArgument { .. } => STATUS_FAILURE,
            ShellError::ImageNotFound(_) | ShellError::NoExecutableImage => STATUS_NOT_FOUND,
            ShellError::Image(ImageError::NotExecutable(_)) => STATUS_NOT_EXECUTABLE,
            ShellError::Image(ImageError::NotRegistered(_)) => STATUS_NOT_FOUND,
            ShellError::Image(_) => STATUS_FAILURE,
            ShellError::Io(_) => STATUS_IO_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShellError::UnknownCommand("chainn".to_string());
        assert_eq!(err.to_string(), "chainn: command not found");

        let err = ShellError::InvalidArgument {
            command: "exit",
            reason: "invalid status 'x'".to_string(),
        };
        assert_eq!(err.to_string(), "exit: invalid status 'x'");

        let err = ShellError::from(ImageError::NotExecutable("kernel".to_string()));
        assert_eq!(err.to_string(), "image 'kernel' is not executable");
    }

    #[test]
    fn test_error_status() {
        assert_eq!(ShellError::UnknownCommand("x".into()).status(), 127);
        assert_eq!(ShellError::ImageNotFound("x".into()).status(), 2);
        assert_eq!(ShellError::NoExecutableImage.status(), 2);
        assert_eq!(
            ShellError::Image(ImageError::NotExecutable("x".into())).status(),
            STATUS_NOT_EXECUTABLE
        );
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(ShellError::Io(io).status(), STATUS_IO_ERROR);
    }
}
