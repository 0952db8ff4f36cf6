//! Per-provider settings.

use gateway_core::ProviderType;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

/// Settings shared by all providers plus one block per provider
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProvidersConfig {
    /// Provider used when a request names none
    #[serde(default = "default_provider")]
    #[validate(length(min = 1))]
    pub default_provider: String,

    /// Timeout for each upstream call, image fetches included
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Groq settings
    #[serde(default)]
    #[validate(nested)]
    pub groq: ProviderSettings,

    /// OpenRouter settings
    #[serde(default)]
    #[validate(nested)]
    pub openrouter: ProviderSettings,

    /// Gemini settings
    #[serde(default)]
    #[validate(nested)]
    pub gemini: ProviderSettings,

    /// Atlas Cloud settings
    #[serde(default)]
    #[validate(nested)]
    pub atlas: ProviderSettings,

    /// Chutes settings
    #[serde(default)]
    #[validate(nested)]
    pub chutes: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            timeout: default_timeout(),
            groq: ProviderSettings::default(),
            openrouter: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
            atlas: ProviderSettings::default(),
            chutes: ProviderSettings::default(),
        }
    }
}

impl ProvidersConfig {
    /// Settings block for a provider
    #[must_use]
    pub fn settings(&self, provider: ProviderType) -> &ProviderSettings {
        match provider {
            ProviderType::Groq => &self.groq,
            ProviderType::OpenRouter => &self.openrouter,
            ProviderType::Gemini => &self.gemini,
            ProviderType::Atlas => &self.atlas,
            ProviderType::Chutes => &self.chutes,
        }
    }

    /// Mutable settings block for a provider
    pub fn settings_mut(&mut self, provider: ProviderType) -> &mut ProviderSettings {
        match provider {
            ProviderType::Groq => &mut self.groq,
            ProviderType::OpenRouter => &mut self.openrouter,
            ProviderType::Gemini => &mut self.gemini,
            ProviderType::Atlas => &mut self.atlas,
            ProviderType::Chutes => &mut self.chutes,
        }
    }
}

/// Overrides for one provider; unset fields fall back to adapter defaults
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProviderSettings {
    /// API key
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// API base URL
    #[serde(default)]
    #[validate(url)]
    pub base_url: Option<String>,

    /// Model used for text-only requests
    #[serde(default)]
    #[validate(length(min = 1))]
    pub default_model: Option<String>,

    /// Model used when an image is attached
    #[serde(default)]
    #[validate(length(min = 1))]
    pub vision_model: Option<String>,
}

fn default_provider() -> String {
    ProviderType::default().as_str().to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
