//! Configuration management for the Aventra itinerary engine
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelAiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AventraConfig {
    /// Generative content provider settings
    #[serde(default)]
    pub content: ContentConfig,
    /// Auxiliary data providers (geocoding, forecast, listings, images)
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Orchestration settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Content provider (Gemini) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// API key, falls back to `GEMINI_API_KEY`
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_content_model")]
    pub model: String,
    /// Base URL of the generative language API
    #[serde(default = "default_content_base_url")]
    pub base_url: String,
    /// Sampling temperature
    #[serde(default = "default_content_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_content_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Auxiliary provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_commons_url")]
    pub commons_url: String,
    #[serde(default = "default_wikipedia_url")]
    pub wikipedia_url: String,
    #[serde(default = "default_openverse_url")]
    pub openverse_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// How day schedules are produced relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DayScheduling {
    /// All days are requested at once
    #[default]
    Concurrent,
    /// Days are requested one after another with a delay in between
    Sequential,
}

/// Orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Budget for one whole itinerary generation
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Maximum number of outbound calls in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub day_scheduling: DayScheduling,
    /// Pause between day requests when scheduling sequentially
    #[serde(default = "default_inter_day_delay")]
    pub inter_day_delay_ms: u64,
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

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

// Default value functions
fn default_content_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_content_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_content_temperature() -> f32 {
    0.3
}

fn default_content_timeout() -> u32 {
    45
}

fn default_max_retries() -> u32 {
    2
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_commons_url() -> String {
    "https://commons.wikimedia.org/w/api.php".to_string()
}

fn default_wikipedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_openverse_url() -> String {
    "https://api.openverse.org/v1/images/".to_string()
}

fn default_provider_timeout() -> u32 {
    15
}

fn default_request_timeout() -> u64 {
    180
}

fn default_max_concurrency() -> usize {
    10
}

fn default_inter_day_delay() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_content_model(),
            base_url: default_content_base_url(),
            temperature: default_content_temperature(),
            timeout_seconds: default_content_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: default_geocoding_base_url(),
            forecast_base_url: default_forecast_base_url(),
            overpass_url: default_overpass_url(),
            commons_url: default_commons_url(),
            wikipedia_url: default_wikipedia_url(),
            openverse_url: default_openverse_url(),
            timeout_seconds: default_provider_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            max_concurrency: default_max_concurrency(),
            day_scheduling: DayScheduling::default(),
            inter_day_delay_ms: default_inter_day_delay(),
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl ContentConfig {
    /// Request timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl ProvidersConfig {
    /// Request timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl GenerationConfig {
    /// Whole-request budget as a `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl AventraConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. AVENTRA__SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("AVENTRA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AventraConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.content.api_key.is_none() {
            config.content.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aventra").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.content.model.is_empty() {
            self.content.model = default_content_model();
        }
        if self.content.base_url.is_empty() {
            self.content.base_url = default_content_base_url();
        }
        if self.content.timeout_seconds == 0 {
            self.content.timeout_seconds = default_content_timeout();
        }
        if self.providers.timeout_seconds == 0 {
            self.providers.timeout_seconds = default_provider_timeout();
        }
        if self.generation.request_timeout_seconds == 0 {
            self.generation.request_timeout_seconds = default_request_timeout();
        }
        if self.generation.max_concurrency == 0 {
            self.generation.max_concurrency = default_max_concurrency();
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
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // A missing key is allowed: every generator degrades to its fallback
        if let Some(api_key) = &self.content.api_key {
            if api_key.is_empty() {
                return Err(TravelAiError::config(
                    "Content API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(TravelAiError::config(
                    "Content API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.content.timeout_seconds > 300 || self.providers.timeout_seconds > 300 {
            return Err(
                TravelAiError::config("Provider timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.content.max_retries > 5 || self.providers.max_retries > 5 {
            return Err(TravelAiError::config("Provider max retries cannot exceed 5").into());
        }

        if self.generation.request_timeout_seconds > 900 {
            return Err(
                TravelAiError::config("Request timeout cannot exceed 900 seconds").into(),
            );
        }

        if self.generation.max_concurrency > 64 {
            return Err(TravelAiError::config("Max concurrency cannot exceed 64").into());
        }

        if !(0.0..=2.0).contains(&self.content.temperature) {
            return Err(
                TravelAiError::config("Content temperature must be between 0.0 and 2.0").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelAiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelAiError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            &self.content.base_url,
            &self.providers.geocoding_base_url,
            &self.providers.forecast_base_url,
            &self.providers.overpass_url,
            &self.providers.commons_url,
            &self.providers.wikipedia_url,
            &self.providers.openverse_url,
        ];
        for url in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelAiError::config(format!(
                    "Provider URL '{url}' must be a valid HTTP or HTTPS URL"
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
        let config = AventraConfig::default();
        assert_eq!(config.content.model, "gemini-2.0-flash");
        assert_eq!(config.content.timeout_seconds, 45);
        assert_eq!(config.providers.timeout_seconds, 15);
        assert_eq!(config.generation.request_timeout_seconds, 180);
        assert_eq!(config.generation.max_concurrency, 10);
        assert_eq!(config.generation.day_scheduling, DayScheduling::Concurrent);
        assert_eq!(config.logging.level, "info");
        assert!(config.content.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = AventraConfig::default();
        config.content.api_key = Some("abc".to_string());
        assert!(config.validate_api_keys().is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AventraConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AventraConfig::default();
        config.content.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = AventraConfig::default();
        config.providers.overpass_url = "ftp://example.org".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = AventraConfig::default();
        config.generation.max_concurrency = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.generation.max_concurrency, 10);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AventraConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("aventra"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
