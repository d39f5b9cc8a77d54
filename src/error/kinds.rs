use std::io;

use thiserror::Error;

/// Crate-wide `Result` type using [`ToolError`] as the error.
///
/// Covers the fallible edges of the crate: loading configuration, decoding
/// reply documents and rendering reports. Building a [`MongoError`] never
/// fails and does not go through this type.
///
/// [`MongoError`]: crate::taxonomy::MongoError
pub type Result<T> = std::result::Result<T, ToolError>;

/// Top-level error type for the crate's own operations.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Extended JSON error: {0}")]
    Bson(#[from] bson::extjson::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },
}

impl From<toml::de::Error> for ToolError {
    fn from(err: toml::de::Error) -> Self {
        ToolError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for ToolError {
    fn from(err: toml::ser::Error) -> Self {
        ToolError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ToolError::from(ConfigError::InvalidValue {
            field: "logging.level".to_string(),
            value: "loud".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value 'loud' for field 'logging.level'"
        );

        let err = ToolError::InvalidInput("expected a document".to_string());
        assert_eq!(err.to_string(), "Invalid input: expected a document");
    }

    #[test]
    fn test_toml_errors_become_config_errors() {
        let err: ToolError = toml::from_str::<toml::Table>("= nope").unwrap_err().into();
        assert!(matches!(err, ToolError::Config(ConfigError::InvalidFormat(_))));
    }
}
