//! Unified error types for Orchard with a fail-open policy for persistence.
//!
//! Gameplay never stops because the save file misbehaves: unreadable storage
//! degrades to an empty ledger and write failures are reported to the caller
//! while the in-memory result stays valid. Configuration errors are the
//! exception and fail fast at load time.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Orchard operations.
#[derive(Error, Debug)]
pub enum OrchardError {
    /// I/O errors from save file or config file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Invalid configuration (bad combo length, duplicate plant ids, ...).
    #[error("config error: {message}")]
    Config { message: String },

    /// A plant id that is not present in the catalog.
    #[error("unknown plant: {plant_id}")]
    UnknownPlant { plant_id: String },
}

/// A specialized Result type for Orchard operations.
pub type Result<T> = std::result::Result<T, OrchardError>;

impl OrchardError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an unknown plant error.
    pub fn unknown_plant(plant_id: impl Into<String>) -> Self {
        Self::UnknownPlant {
            plant_id: plant_id.into(),
        }
    }
}

impl From<io::Error> for OrchardError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for OrchardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Logs the error at warn level and substitutes a fallback value.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the Orchard CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command ran but reported a failure (unknown plant, bad config).
    pub const FAILURE: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = OrchardError::storage(
            "/tmp/fruit_save.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/fruit_save.json"));
    }

    #[test]
    fn test_config_error_display() {
        let err = OrchardError::config("ideal combo must have 4 actions");
        assert_eq!(
            err.to_string(),
            "config error: ideal combo must have 4 actions"
        );
    }

    #[test]
    fn test_unknown_plant_display() {
        let err = OrchardError::unknown_plant("kiwi");
        assert_eq!(err.to_string(), "unknown plant: kiwi");
    }

    #[test]
    fn test_from_io_error_has_empty_path() {
        let err = OrchardError::from(io::Error::other("disk full"));
        match &err {
            OrchardError::Storage { path, .. } => assert!(path.as_os_str().is_empty()),
            other => panic!("expected storage error, got {:?}", other),
        }
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: OrchardError = json_err.into();
        assert!(matches!(err, OrchardError::Serde { .. }));
    }

    #[test]
    fn test_fail_open_default() {
        let result: Result<Vec<u8>> = Err(OrchardError::config("corrupt"));
        let value = result.fail_open_default("loading ledger");
        assert!(value.is_empty());
    }

    #[test]
    fn test_fail_open_with() {
        let result: Result<i32> = Err(OrchardError::config("corrupt"));
        assert_eq!(result.fail_open_with("loading ledger", 7), 7);
    }

    #[test]
    fn test_fail_open_success() {
        let result: Result<i32> = Ok(100);
        assert_eq!(result.fail_open_default("loading ledger"), 100);
    }
}
