//! # Persisted plugin configuration.
//!
//! Provides [`Config`], the settings loaded once at startup from `AutoStop.json`.
//!
//! ## File format
//! ```text
//! {
//!   "Delay": 600000,               // milliseconds before an empty server stops
//!   "StopBeforeFirstJoin": false   // arm the countdown at startup when nobody is online
//! }
//! ```
//!
//! ## Recovery rules
//! - missing, unreadable or unparsable file → defaults are written and used
//! - negative `Delay` → replaced by the default, with a warning
//! - a failed write of the defaults is logged, never fatal
//!
//! Missing keys take their default value, so a partial file is accepted.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the host's data directory.
pub const FILE_NAME: &str = "AutoStop.json";

/// Default delay: ten minutes.
pub const DEFAULT_DELAY_MS: i64 = 600_000;

/// Startup configuration.
///
/// ## Field semantics
/// - `delay`: milliseconds to wait after the last player left (`>= 0` once validated)
/// - `stop_before_first_join`: also start the countdown when the server comes up empty
///
/// `delay` is kept signed so that a negative value in the file can be detected
/// and corrected instead of failing deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    /// Countdown length in milliseconds.
    pub delay: i64,
    /// Arm the countdown on server-ready when zero players are online.
    pub stop_before_first_join: bool,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `delay = 600000` (10 minutes)
    /// - `stop_before_first_join = false`
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY_MS,
            stop_before_first_join: false,
        }
    }
}

impl Config {
    /// Returns the configuration path inside `dir`.
    pub fn file_path(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(FILE_NAME)
    }

    /// Returns the countdown as a [`Duration`].
    ///
    /// Negative values (only possible before [`validated`](Self::validated))
    /// are treated as the default.
    #[inline]
    pub fn delay(&self) -> Duration {
        let ms = if self.delay < 0 {
            DEFAULT_DELAY_MS
        } else {
            self.delay
        };
        Duration::from_millis(ms as u64)
    }

    /// Reads and parses the file without any recovery.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the configuration as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(self).map_err(|e| write_err(e.into()))?;
        fs::write(path, body).map_err(write_err)
    }

    /// Loads the file, falling back to (and persisting) defaults when it cannot be used.
    ///
    /// The result is always [`validated`](Self::validated).
    pub fn load_or_init(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let cfg = match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                if err.is_missing() {
                    tracing::info!(path = %path.display(), "config not found; writing defaults");
                } else {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err.as_message(),
                        "config unusable; writing defaults"
                    );
                }

                let cfg = Self::default();
                if let Err(write_err) = cfg.save(path) {
                    tracing::warn!(
                        label = write_err.as_label(),
                        error = %write_err.as_message(),
                        "could not persist default config"
                    );
                }
                cfg
            }
        };
        cfg.validated()
    }

    /// Corrects values that serde defaults cannot express.
    pub fn validated(mut self) -> Self {
        if self.delay < 0 {
            tracing::warn!(
                delay = self.delay,
                default = DEFAULT_DELAY_MS,
                "config Delay is negative; using default"
            );
            self.delay = DEFAULT_DELAY_MS;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pascal_case_keys() {
        let cfg: Config =
            serde_json::from_str(r#"{ "Delay": 1500, "StopBeforeFirstJoin": true }"#).unwrap();
        assert_eq!(cfg.delay, 1500);
        assert!(cfg.stop_before_first_join);
        assert_eq!(cfg.delay(), Duration::from_millis(1500));
    }

    #[test]
    fn missing_keys_take_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "StopBeforeFirstJoin": true }"#).unwrap();
        assert_eq!(cfg.delay, DEFAULT_DELAY_MS);
        assert!(cfg.stop_before_first_join);
    }

    #[test]
    fn negative_delay_is_reset() {
        let cfg = Config {
            delay: -5,
            stop_before_first_join: false,
        }
        .validated();
        assert_eq!(cfg.delay, DEFAULT_DELAY_MS);
    }

    #[test]
    fn negative_delay_logs_warning() {
        let logs = crate::testing::LogBuffer::default();
        let _guard = logs.install();

        Config {
            delay: -5,
            stop_before_first_join: false,
        }
        .validated();

        let out = logs.contents();
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("config Delay is negative; using default"), "{out}");
        assert!(out.contains("delay=-5"), "{out}");
    }

    #[test]
    fn zero_delay_is_kept() {
        let cfg = Config {
            delay: 0,
            stop_before_first_join: false,
        }
        .validated();
        assert_eq!(cfg.delay(), Duration::ZERO);
    }

    #[test]
    fn serializes_with_file_keys() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["Delay"], 600_000);
        assert_eq!(json["StopBeforeFirstJoin"], false);
    }

    #[test]
    fn garbage_file_is_replaced_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::file_path(dir.path());
        fs::write(&path, "not json").unwrap();

        let cfg = Config::load_or_init(&path);
        assert_eq!(cfg, Config::default());
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn defaults_are_written_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        let cfg = Config::load_or_init(&path);
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }
}
