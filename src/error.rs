//! Top-level error types for the AutoNBI command line tool.
//!
//! Library code reports [`crate::nbi::Error`]; the CLI wraps it together with
//! argument and environment problems in [`AutoNbiError`].

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, AutoNbiError>;

/// Main error type for the command line tool
#[derive(Error, Debug)]
pub enum AutoNbiError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// NBI build errors
    #[error("{0}")]
    Nbi(#[from] crate::nbi::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// The tool was started without root privileges
    #[error("This tool requires sudo or root privileges.")]
    NotRoot,

    /// The interactive installer picker was cancelled or failed
    #[error("Not a valid selection - unable to proceed. ({reason})")]
    SelectionCancelled {
        /// Reason reported by the prompt
        reason: String,
    },
}

impl From<inquire::InquireError> for AutoNbiError {
    fn from(err: inquire::InquireError) -> Self {
        AutoNbiError::Cli(CliError::SelectionCancelled {
            reason: err.to_string(),
        })
    }
}
