//! Error types used by the autostop runtime and its host.
//!
//! This module defines two main error enums:
//!
//! - [`ConfigError`] — failures while reading or writing the configuration file.
//! - [`ShutdownError`] — failures reported by the host when a shutdown is requested.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//! Neither is ever fatal for the runtime: configuration errors are recovered by
//! falling back to defaults and shutdown errors are reported once.

use std::path::PathBuf;
use thiserror::Error;

/// # Errors produced while loading or persisting the configuration file.
///
/// [`Config::load_or_init`](crate::Config::load_or_init) recovers from all of
/// them; [`Config::load`](crate::Config::load) returns them to the caller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file is missing or could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid configuration document.
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Writing the default configuration failed.
    #[error("failed to write config {path:?}: {source}")]
    Write {
        /// Path that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use autostop::ConfigError;
    ///
    /// let err = ConfigError::Read {
    ///     path: "AutoStop.json".into(),
    ///     source: std::io::Error::from(std::io::ErrorKind::NotFound),
    /// };
    /// assert_eq!(err.as_label(), "config_read");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read",
            ConfigError::Parse { .. } => "config_parse",
            ConfigError::Write { .. } => "config_write",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::Read { path, source } => {
                format!("read {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                format!("parse {}: {source}", path.display())
            }
            ConfigError::Write { path, source } => {
                format!("write {}: {source}", path.display())
            }
        }
    }

    /// Returns `true` when the file simply does not exist yet.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ConfigError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// # Errors produced by the host while executing a shutdown request.
///
/// The scheduler never retries: the error is handed to
/// [`Host::report_error`](crate::Host::report_error) and published as
/// `EventKind::ShutdownFailed`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ShutdownError {
    /// The host refused or failed to stop.
    #[error("shutdown rejected: {error}")]
    Rejected {
        /// The underlying error message.
        error: String,
    },

    /// The host is no longer reachable (already stopping, channel closed, ...).
    #[error("host unavailable: {error}")]
    Unavailable {
        /// The underlying error message.
        error: String,
    },
}

impl ShutdownError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use autostop::ShutdownError;
    ///
    /// let err = ShutdownError::Rejected { error: "busy".into() };
    /// assert_eq!(err.as_label(), "shutdown_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownError::Rejected { .. } => "shutdown_rejected",
            ShutdownError::Unavailable { .. } => "shutdown_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ShutdownError::Rejected { error } => format!("rejected: {error}"),
            ShutdownError::Unavailable { error } => format!("unavailable: {error}"),
        }
    }
}
