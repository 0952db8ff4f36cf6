//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level, so operators can
//! raise verbosity for a single module without touching configuration.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `gateway_providers=debug`
    pub level: String,
    /// Emit JSON lines
    pub json: bool,
    /// Include the event target
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Toggle JSON output
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Toggle the event target
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Filter built from `RUST_LOG`, falling back to the configured level
    ///
    /// # Errors
    /// Returns error if the configured level is not a valid directive
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| LoggingError::InvalidLevel(format!("{}: {e}", self.level))),
        }
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns error if the level is invalid or a subscriber is already set
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;

    let (json_layer, text_layer) = if config.json {
        (
            Some(fmt::layer().json().with_target(config.with_target)),
            None,
        )
    } else {
        (None, Some(fmt::layer().with_target(config.with_target)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    info!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to install the subscriber
    #[error("Failed to initialize logging: {0}")]
    Init(String),
    /// Level is not a valid filter directive
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
}

/// Create a span for one chat completion
#[macro_export]
macro_rules! llm_request_span {
    ($request_id:expr, $provider:expr) => {
        tracing::info_span!(
            "chat_completion",
            request_id = %$request_id,
            provider = %$provider,
        )
    };
}

/// Create a span for one upstream call
#[macro_export]
macro_rules! provider_span {
    ($provider:expr, $model:expr) => {
        tracing::debug_span!(
            "provider_call",
            provider = %$provider,
            model = %$model,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LoggingConfig::new()
            .with_level("debug")
            .with_json(true)
            .with_target(false);

        assert_eq!(config.level, "debug");
        assert!(config.json);
        assert!(!config.with_target);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }

    #[test]
    fn test_span_macros_expand() {
        let span = llm_request_span!("req-1", "groq");
        let _entered = span.enter();
        let _inner = provider_span!("groq", "openai/gpt-oss-120b");
    }
}
