//! Configuration management for mongo-classify
//!
//! This module handles loading, parsing, and validating configuration:
//! - Stale-primary patterns used by the classifier
//! - Logging settings
//! - Report display settings
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file (TOML format)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::taxonomy::{Classifier, StalePrimaryPatterns};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Patterns the classifier uses to recognize a stale primary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Error categories (`codeName` or error labels)
    #[serde(default = "default_stale_primary_categories")]
    pub stale_primary_categories: Vec<String>,

    /// Server error codes
    #[serde(default = "default_stale_primary_codes")]
    pub stale_primary_codes: Vec<i32>,

    /// Case-insensitive message prefixes
    #[serde(default = "default_stale_primary_messages")]
    pub stale_primary_messages: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Report display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format (json, json-pretty, text)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One compact JSON report per line
    Json,

    /// Indented JSON reports
    JsonPretty,

    /// One summary line per report
    Text,
}

// Default value functions
fn default_stale_primary_categories() -> Vec<String> {
    StalePrimaryPatterns::default().categories
}

fn default_stale_primary_codes() -> Vec<i32> {
    StalePrimaryPatterns::default().codes
}

fn default_stale_primary_messages() -> Vec<String> {
    StalePrimaryPatterns::default().messages
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::JsonPretty
}

fn default_color_output() -> bool {
    true
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            stale_primary_categories: default_stale_primary_categories(),
            stale_primary_codes: default_stale_primary_codes(),
            stale_primary_messages: default_stale_primary_messages(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color_output: default_color_output(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Explicit config path, or `None` for the default location
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration. A missing default file yields
    ///   the defaults; a missing explicit file is an error.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.mongo-classify/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mongo-classify")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        let classifier = &self.classifier;

        if classifier.stale_primary_categories.is_empty()
            && classifier.stale_primary_codes.is_empty()
            && classifier.stale_primary_messages.is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "classifier".to_string(),
                value: "no stale primary patterns".to_string(),
            }
            .into());
        }

        if let Some(blank) = classifier
            .stale_primary_categories
            .iter()
            .chain(classifier.stale_primary_messages.iter())
            .find(|pattern| pattern.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "classifier".to_string(),
                value: format!("'{blank}'"),
            }
            .into());
        }

        Ok(())
    }
}

impl ClassifierConfig {
    /// Stale-primary pattern set described by this configuration
    pub fn patterns(&self) -> StalePrimaryPatterns {
        StalePrimaryPatterns {
            categories: self.stale_primary_categories.clone(),
            codes: self.stale_primary_codes.clone(),
            messages: self.stale_primary_messages.clone(),
        }
    }

    /// Build a classifier using these patterns
    pub fn build_classifier(&self) -> Classifier {
        Classifier::new(self.patterns())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl OutputFormat {
    /// Check if format is JSON-based
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }

    /// Parse a format name as accepted on the command line
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "pretty" => Some(OutputFormat::JsonPretty),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::taxonomy::{ErrorKind, ServerReply};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.format, OutputFormat::JsonPretty);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.classifier.patterns(), StalePrimaryPatterns::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [classifier]
            stale_primary_messages = ["not writable primary"]

            [display]
            format = "text"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.classifier.stale_primary_messages,
            vec!["not writable primary".to_string()]
        );
        assert_eq!(
            config.classifier.stale_primary_codes,
            StalePrimaryPatterns::default().codes
        );
        assert_eq!(config.display.format, OutputFormat::Text);
        assert!(config.display.color_output);
        assert!(config.logging.timestamps);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ToolError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_validate_rejects_empty_patterns() {
        let mut config = Config::default();
        config.classifier.stale_primary_categories.clear();
        config.classifier.stale_primary_codes.clear();
        config.classifier.stale_primary_messages.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classifier.stale_primary_messages.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load_from_file(Some(Path::new("/nonexistent/mongo-classify.toml")))
            .unwrap_err();
        assert!(matches!(err, ToolError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_configured_classifier() {
        let config = Config::from_toml_str(
            r#"
            [classifier]
            stale_primary_categories = []
            stale_primary_codes = []
            stale_primary_messages = ["primary moved"]
            "#,
        )
        .unwrap();
        let classifier = config.classifier.build_classifier();

        let err = classifier.classify(&ServerReply::new("Primary moved to b:27017").into());
        assert_eq!(err.kind(), ErrorKind::StalePrimaryError);

        let err = classifier.classify(&ServerReply::new("not master").into());
        assert_eq!(err.kind(), ErrorKind::OperationFailure);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("json-pretty"), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("table"), None);
        assert!(OutputFormat::Json.is_json());
        assert!(!OutputFormat::Text.is_json());
    }
}
