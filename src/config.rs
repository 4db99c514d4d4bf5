//! Configuration management for the Haiku backend
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables (including a `.env` file in the working directory), and
//! validates the result before the server starts.

use crate::HaikuError;
use crate::models::Coordinates;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HaikuConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub suggestion: SuggestionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Document store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the database files
    #[serde(default = "default_store_path")]
    pub path: String,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider credential. Weather endpoints report an error payload without it.
    pub api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

/// Text-generation provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Provider credential. Suggestions fall back to a placeholder without it.
    pub api_key: Option<String>,
    #[serde(default = "default_suggestion_base_url")]
    pub base_url: String,
    #[serde(default = "default_suggestion_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_suggestion_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_store_path() -> String {
    "data/haiku".to_string()
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_latitude() -> f64 {
    Coordinates::REFERENCE.latitude
}

fn default_longitude() -> f64 {
    Coordinates::REFERENCE.longitude
}

fn default_suggestion_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_suggestion_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_suggestion_timeout() -> u32 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_suggestion_base_url(),
            model: default_suggestion_model(),
            timeout_seconds: default_suggestion_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Conventional variable names used by the provider SDKs
const WEATHER_KEY_VAR: &str = "WEATHER_API_KEY";
const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

const ENV_FILE: &str = ".env";

/// Exports `KEY=value` lines from `path` into the process environment.
/// Variables that are already set keep their value. A missing file is fine.
fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

impl HaikuConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        load_env_file(Path::new(ENV_FILE))?;

        let mut builder = Config::builder();

        let config_file = config_path
            .or_else(|| std::env::var_os("HAIKU_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("haiku.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // HAIKU_WEATHER__API_KEY, HAIKU_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("HAIKU")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: HaikuConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.apply_env_credentials();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Fill unset credentials from the conventional provider variables
    fn apply_env_credentials(&mut self) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = std::env::var(WEATHER_KEY_VAR).ok();
        }
        if self.suggestion.api_key.is_none() {
            self.suggestion.api_key = std::env::var(GEMINI_KEY_VAR).ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        // An empty credential means "not configured"
        if self.weather.api_key.as_deref().is_some_and(str::is_empty) {
            self.weather.api_key = None;
        }
        if self.suggestion.api_key.as_deref().is_some_and(str::is_empty) {
            self.suggestion.api_key = None;
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.suggestion.base_url.is_empty() {
            self.suggestion.base_url = default_suggestion_base_url();
        }
        if self.suggestion.model.is_empty() {
            self.suggestion.model = default_suggestion_model();
        }
        if self.suggestion.timeout_seconds == 0 {
            self.suggestion.timeout_seconds = default_suggestion_timeout();
        }
        if self.store.path.is_empty() {
            self.store.path = default_store_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Coordinates used when a weather request omits `lat`/`lon`
    #[must_use]
    pub fn default_coordinates(&self) -> Coordinates {
        Coordinates::new(self.weather.default_latitude, self.weather.default_longitude)
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(HaikuError::config("Server port cannot be 0").into());
        }

        if self.weather.timeout_seconds > 300 {
            return Err(HaikuError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.suggestion.timeout_seconds > 300 {
            return Err(
                HaikuError::config("Suggestion API timeout cannot exceed 300 seconds").into(),
            );
        }

        if !(-90.0..=90.0).contains(&self.weather.default_latitude) {
            return Err(HaikuError::config("Default latitude must be within -90..=90").into());
        }

        if !(-180.0..=180.0).contains(&self.weather.default_longitude) {
            return Err(HaikuError::config("Default longitude must be within -180..=180").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(HaikuError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(HaikuError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("Suggestion", &self.suggestion.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(HaikuError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HaikuConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.weather.base_url, "http://api.weatherapi.com/v1");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.suggestion.model, "gemini-2.0-flash");
        assert_eq!(config.suggestion.timeout_seconds, 15);
        assert_eq!(config.logging.level, "info");
        assert!(config.weather.api_key.is_none());
        assert!(config.suggestion.api_key.is_none());
        assert_eq!(config.default_coordinates(), Coordinates::REFERENCE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_credentials_are_unset() {
        let mut config = HaikuConfig::default();
        config.weather.api_key = Some(String::new());
        config.suggestion.api_key = Some(String::new());
        config.apply_defaults();
        assert!(config.weather.api_key.is_none());
        assert!(config.suggestion.api_key.is_none());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = HaikuConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = HaikuConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = HaikuConfig::default();
        config.weather.default_latitude = 123.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = HaikuConfig::default();
        config.suggestion.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("HTTP or HTTPS"));
    }

    #[test]
    fn test_env_file_supplies_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "WEATHER_API_KEY=from-dotenv\n").unwrap();
        let preset = std::env::var(WEATHER_KEY_VAR).ok();

        load_env_file(&env_file).unwrap();

        let mut config = HaikuConfig::default();
        config.apply_env_credentials();
        // An already exported variable takes precedence over the file
        let expected = preset.unwrap_or_else(|| "from-dotenv".to_string());
        assert_eq!(config.weather.api_key.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(&dir.path().join(".env")).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haiku.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9100

[weather]
api_key = "file-key"
timeout_seconds = 5

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = HaikuConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.weather.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.weather.timeout_seconds, 5);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.store.path, "data/haiku");
    }
}
