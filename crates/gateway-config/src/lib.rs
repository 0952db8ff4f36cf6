//! # Gateway Config
//!
//! Configuration for the chat completion gateway.
//!
//! Configuration is assembled in three layers:
//! 1. Built-in defaults
//! 2. An optional YAML or TOML file named by `GATEWAY_CONFIG`
//! 3. Environment variable overrides (server address, log level, API keys)
//!
//! [`GatewayConfig`] also serves as the gateway's [`CredentialStore`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod providers;

pub use error::ConfigError;
pub use providers::{ProviderSettings, ProvidersConfig};

use gateway_core::credentials::non_empty;
use gateway_core::{CredentialStore, ProviderType};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use validator::Validate;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GatewayConfig {
    /// HTTP server settings
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    /// Provider settings
    #[serde(default)]
    #[validate(nested)]
    pub providers: ProvidersConfig,

    /// Logging settings
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Outer deadline for a chat completion
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoggingSettings {
    /// Default log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    #[validate(length(min = 1))]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GatewayConfig {
    /// Load configuration from `GATEWAY_CONFIG` (if set) and the environment
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_with(path.as_deref().map(Path::new), |key| std::env::var(key).ok())
    }

    /// Load configuration from an optional file and an environment lookup
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides_from(lookup)?;
        config.check()?;
        Ok(config)
    }

    /// Parse a configuration file, TOML when the extension is `.toml`,
    /// YAML otherwise
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            toml::from_str(&contents).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| e.to_string())
        };

        debug!(path = %path.display(), toml = is_toml, "Loaded configuration file");

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// # Errors
    /// Returns error if `GATEWAY_PORT` is not a valid port
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = lookup("GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GATEWAY_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value("GATEWAY_PORT", format!("not a port: {port}")))?;
        }
        if let Some(level) = lookup("GATEWAY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(provider) = lookup("GATEWAY_DEFAULT_PROVIDER") {
            self.providers.default_provider = provider;
        }

        for provider in ProviderType::ALL {
            if let Some(key) = lookup(provider.api_key_env()) {
                self.providers.settings_mut(provider).api_key = Some(SecretString::new(key));
            }
        }

        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns error on the first invalid setting
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;

        if !self.is_valid_provider(&self.providers.default_provider) {
            return Err(ConfigError::invalid_value(
                "providers.default_provider",
                format!("unsupported provider: {}", self.providers.default_provider),
            ));
        }

        for provider in ProviderType::ALL {
            if let Some(base_url) = &self.providers.settings(provider).base_url {
                let parsed = url::Url::parse(base_url).map_err(|e| {
                    ConfigError::invalid_value(format!("providers.{provider}.base_url"), e.to_string())
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ConfigError::invalid_value(
                        format!("providers.{provider}.base_url"),
                        format!("unsupported scheme: {}", parsed.scheme()),
                    ));
                }
            }
        }

        if self.providers.timeout.is_zero() {
            return Err(ConfigError::invalid_value(
                "providers.timeout",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

impl CredentialStore for GatewayConfig {
    fn api_key(&self, provider: &str) -> Option<SecretString> {
        let provider = provider.parse::<ProviderType>().ok()?;
        non_empty(self.providers.settings(provider).api_key.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout, Duration::from_secs(60));
        assert_eq!(config.providers.default_provider, "groq");
        assert_eq!(config.providers.timeout, Duration::from_secs(30));
        assert_eq!(config.logging.level, "info");
        assert!(config.check().is_ok());
        assert!(!config.has_any_api_key());
    }

    #[test]
    fn test_env_overrides_populate_api_keys() {
        let config = GatewayConfig::load_with(
            None,
            env(&[
                ("GROQ_API_KEY", "gsk-test"),
                ("ATLASCLOUD_API_KEY", "atlas-test"),
                ("CHUTES_API_KEY", ""),
                ("GATEWAY_PORT", "9090"),
                ("GATEWAY_DEFAULT_PROVIDER", "gemini"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_key("groq").unwrap().expose_secret(), "gsk-test");
        assert_eq!(config.api_key("atlas").unwrap().expose_secret(), "atlas-test");
        assert!(config.api_key("chutes").is_none());
        assert!(config.api_key("made_up").is_none());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.providers.default_provider, "gemini");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = GatewayConfig::load_with(None, env(&[("GATEWAY_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_unsupported_default_provider_rejected() {
        let result =
            GatewayConfig::load_with(None, env(&[("GATEWAY_DEFAULT_PROVIDER", "made_up")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r"
server:
  port: 3000
  request_timeout: 90s
providers:
  timeout: 10s
  gemini:
    api_key: g-from-file
    default_model: gemini-2.5-pro
logging:
  json: true
"
        )
        .unwrap();

        let config = GatewayConfig::load_with(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout, Duration::from_secs(90));
        assert_eq!(config.providers.timeout, Duration::from_secs(10));
        assert_eq!(
            config.providers.gemini.default_model.as_deref(),
            Some("gemini-2.5-pro")
        );
        assert_eq!(config.api_key("gemini").unwrap().expose_secret(), "g-from-file");
        assert!(config.logging.json);
    }

    #[test]
    fn test_toml_file_and_env_precedence() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"

[providers.groq]
api_key = "from-file"
base_url = "http://localhost:9999/v1"
"#
        )
        .unwrap();

        let config = GatewayConfig::load_with(
            Some(file.path()),
            env(&[("GROQ_API_KEY", "from-env")]),
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.api_key("groq").unwrap().expose_secret(), "from-env");
        assert_eq!(
            config.providers.groq.base_url.as_deref(),
            Some("http://localhost:9999/v1")
        );
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = GatewayConfig::default();
        config.providers.chutes.base_url = Some("ftp://llm.example.com".to_string());
        assert!(config.check().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = GatewayConfig::load_with(Some(Path::new("/nonexistent/gateway.yaml")), env(&[]));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
