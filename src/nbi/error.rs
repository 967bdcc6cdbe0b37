//! Error types for NBI build operations.
//!
//! [`Error`] covers everything that can go wrong while resolving sources,
//! driving `hdiutil` and friends, and unpacking installer payloads. The
//! [`Context`] and [`ErrorExt`] traits attach human-readable context as errors
//! propagate, and [`bail!`](crate::bail) returns early with a formatted message.

use std::{fmt::Display, path::PathBuf};

/// Result type alias for NBI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building an NBI.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An error wrapped with a description of what was being done.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// A filesystem operation on a specific path failed.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        context: &'static str,
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Automatic mode found more than one installer source.
    #[error(
        "found {count} installer sources in {} - automatic mode needs exactly one",
        path.display()
    )]
    MultipleInstallers { path: PathBuf, count: usize },

    /// No installer source was found below a folder.
    #[error("no suitable installers found in {}", .0.display())]
    NoInstallers(PathBuf),

    /// A package payload could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Plist(#[from] plist::Error),

    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    #[error("{0}")]
    Glob(#[from] glob::PatternError),

    #[error("{0}")]
    GenericError(String),
}

/// Adds context to results and options.
pub trait Context<T> {
    /// Wraps the error value with additional context.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wraps the error value with lazily evaluated context.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attaches the failing path to io errors.
pub trait ErrorExt<T> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Returns early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::nbi::Error::GenericError(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::nbi::Error::GenericError($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::nbi::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
