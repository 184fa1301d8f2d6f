//! Error types and handling for the Aventra itinerary engine

use thiserror::Error;

/// Number of characters of an unparseable payload kept for diagnostics
pub const PARSE_SNIPPET_LIMIT: usize = 2000;

/// Main error type for the itinerary engine
#[derive(Error, Debug)]
pub enum TravelAiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An external provider could not be reached after all retries
    #[error("Upstream unavailable ({provider}): {message}")]
    UpstreamUnavailable { provider: String, message: String },

    /// Structured data could not be recovered from a provider response
    #[error("Parse error: {message}")]
    Parse { message: String, snippet: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The whole generation exceeded its time budget
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A failure that escaped every fallback
    #[error("Generation failed: {message}")]
    Generation { message: String },
}

impl TravelAiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new upstream error for the named provider
    pub fn upstream<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a parse error, keeping the head of the offending payload
    pub fn parse<S: Into<String>>(message: S, payload: &str) -> Self {
        Self::Parse {
            message: message.into(),
            snippet: payload.chars().take(PARSE_SNIPPET_LIMIT).collect(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    #[must_use]
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Create a new generation error
    pub fn generation<S: Into<String>>(message: S) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Stable machine-readable code used by the HTTP layer
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            TravelAiError::Validation { .. } => "validation_failed",
            TravelAiError::Timeout { .. } => "request_timeout",
            TravelAiError::Config { .. } => "configuration_error",
            TravelAiError::UpstreamUnavailable { .. }
            | TravelAiError::Parse { .. }
            | TravelAiError::Generation { .. } => "generation_failed",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelAiError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TravelAiError::UpstreamUnavailable { .. } => {
                "Unable to reach external travel services. Please try again later.".to_string()
            }
            TravelAiError::Parse { .. } | TravelAiError::Generation { .. } => {
                "The itinerary could not be generated.".to_string()
            }
            TravelAiError::Validation { message } => format!("Invalid input: {message}"),
            TravelAiError::Timeout { seconds } => {
                format!("Itinerary generation did not finish within {seconds} seconds.")
            }
        }
    }
}

impl From<reqwest::Error> for TravelAiError {
    fn from(err: reqwest::Error) -> Self {
        let provider = err
            .url()
            .and_then(|url| url.host_str())
            .unwrap_or("unknown")
            .to_string();
        TravelAiError::upstream(provider, err.to_string())
    }
}

impl From<reqwest_middleware::Error> for TravelAiError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(inner) => inner.into(),
            reqwest_middleware::Error::Middleware(inner) => {
                TravelAiError::upstream("middleware", inner.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for TravelAiError {
    fn from(err: serde_json::Error) -> Self {
        TravelAiError::Parse {
            message: err.to_string(),
            snippet: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TravelAiError::config("missing API key");
        assert!(matches!(config_err, TravelAiError::Config { .. }));

        let upstream_err = TravelAiError::upstream("gemini", "connection failed");
        assert!(matches!(upstream_err, TravelAiError::UpstreamUnavailable { .. }));

        let validation_err = TravelAiError::validation("end date before start date");
        assert!(matches!(validation_err, TravelAiError::Validation { .. }));
    }

    #[test]
    fn test_parse_error_truncates_snippet() {
        let payload = "x".repeat(PARSE_SNIPPET_LIMIT + 500);
        match TravelAiError::parse("no json", &payload) {
            TravelAiError::Parse { snippet, .. } => {
                assert_eq!(snippet.chars().count(), PARSE_SNIPPET_LIMIT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TravelAiError::validation("x").error_code(),
            "validation_failed"
        );
        assert_eq!(TravelAiError::timeout(180).error_code(), "request_timeout");
        assert_eq!(
            TravelAiError::generation("boom").error_code(),
            "generation_failed"
        );
        assert_eq!(
            TravelAiError::parse("bad", "{").error_code(),
            "generation_failed"
        );
    }

    #[test]
    fn test_user_messages() {
        let config_err = TravelAiError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let timeout_err = TravelAiError::timeout(180);
        assert!(timeout_err.user_message().contains("180"));

        let validation_err = TravelAiError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }
}
