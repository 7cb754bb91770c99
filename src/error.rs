//! Error types for controller database operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::db::{DecodeError, Key};

/// Primary error type for joycal operations.
#[derive(Error, Debug)]
pub enum JoyError {
    // Database content errors
    #[error("Malformed profile {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Duplicate profile for {key} in {} (already loaded from {})", second.display(), first.display())]
    DuplicateKey {
        key: Key,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Cannot save a profile with no match rules")]
    InvalidIdentity,

    #[error("Path is outside the profile directory: {}", path.display())]
    OutsideDatabase { path: PathBuf },

    #[error("Profile file not found: {}", path.display())]
    NotFound { path: PathBuf },

    // Configuration errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // General errors
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl JoyError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. }
                | Self::DuplicateKey { .. }
                | Self::InvalidIdentity
                | Self::OutsideDatabase { .. }
                | Self::NotFound { .. }
                | Self::InvalidArgument(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Decode { .. } => Some("Fix or delete the file; it is skipped until then"),
            Self::DuplicateKey { .. } => Some("Remove one of the files with the same [match] section"),
            Self::InvalidIdentity => Some("Pin at least one of vendor, product, version or name"),
            Self::NotFound { .. } => Some("Run: joycal list"),
            Self::ConfigParse(_) | Self::ConfigInvalid(_) => Some("Check the file given by --config"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using JoyError.
pub type Result<T> = std::result::Result<T, JoyError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| JoyError::Other(format!("{}: {e}", f().into())))
    }
}
