//! Adapter configuration.

use gateway_config::ProviderSettings;
use gateway_core::{ChatRequest, ProviderType};
use std::time::Duration;

/// Default timeout for upstream calls and image fetches
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection details and model defaults for one adapter
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which upstream this configures
    pub provider: ProviderType,
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// Model for text-only requests
    pub default_model: String,
    /// Model for requests carrying an image
    pub vision_model: String,
    /// Per-call timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Built-in defaults for a provider
    #[must_use]
    pub fn new(provider: ProviderType) -> Self {
        let (base_url, default_model, vision_model) = match provider {
            ProviderType::Groq => (
                "https://api.groq.com/openai/v1",
                "openai/gpt-oss-120b",
                "meta-llama/llama-4-maverick-17b-128e-instruct",
            ),
            ProviderType::OpenRouter => (
                "https://openrouter.ai/api/v1",
                "deepseek/deepseek-chat-v3.1:free",
                "google/gemini-2.5-flash-image-preview:free",
            ),
            ProviderType::Gemini => (
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-2.5-flash",
                "gemini-2.5-flash",
            ),
            ProviderType::Atlas => (
                "https://api.atlascloud.ai/v1",
                "openai/gpt-oss-20b",
                "openai/gpt-oss-20b",
            ),
            ProviderType::Chutes => (
                "https://llm.chutes.ai/v1",
                "zai-org/GLM-4.5-FP8",
                "zai-org/GLM-4.5-FP8",
            ),
        };

        Self {
            provider,
            base_url: base_url.to_string(),
            default_model: default_model.to_string(),
            vision_model: vision_model.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Defaults overlaid with configured settings
    #[must_use]
    pub fn from_settings(provider: ProviderType, settings: &ProviderSettings, timeout: Duration) -> Self {
        let mut config = Self::new(provider).with_timeout(timeout);
        if let Some(base_url) = &settings.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(model) = &settings.default_model {
            config.default_model.clone_from(model);
        }
        if let Some(model) = &settings.vision_model {
            config.vision_model.clone_from(model);
        }
        config
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the text model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the vision model
    #[must_use]
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Model to send: the request's own, else the vision or text default
    #[must_use]
    pub fn resolve_model(&self, request: &ChatRequest) -> String {
        match request.model.as_deref().map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ if request.contains_image() => self.vision_model.clone(),
            _ => self.default_model.clone(),
        }
    }
}
