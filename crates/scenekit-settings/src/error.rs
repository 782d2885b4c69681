//! Error types for loading, saving and validating editor configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to read or write a config file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no per-user config directory on this platform")]
    NoConfigDir,

    #[error("cannot create config directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("cannot encode TOML config: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A config that parsed but cannot drive the editor.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("unsupported config extension '{0}', expected .json or .toml")]
    UnsupportedFormat(String),

    #[error("{key} must be {expected}, got {value}")]
    ValueOutOfRange {
        key: String,
        value: f64,
        expected: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn out_of_range(key: &str, value: f64, expected: &'static str) -> Self {
        ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value,
            expected,
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_key_and_path() {
        let err = ConfigError::out_of_range("handles.handle_size", -1.0, "positive");
        assert_eq!(err.to_string(), "handles.handle_size must be positive, got -1");

        let err = SettingsError::Read {
            path: PathBuf::from("/tmp/editor.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "cannot read /tmp/editor.toml: missing");
    }

    #[test]
    fn test_validation_errors_pass_through_unchanged() {
        let err: SettingsError = ConfigError::UnsupportedFormat("ini".to_string()).into();
        assert_eq!(
            err.to_string(),
            "unsupported config extension 'ini', expected .json or .toml"
        );
        assert!(matches!(err, SettingsError::Config(ConfigError::UnsupportedFormat(_))));
    }
}
