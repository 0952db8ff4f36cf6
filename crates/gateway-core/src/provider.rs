//! Provider trait and related types.
//!
//! Every upstream is reached through an [`LLMProvider`] trait object, so the
//! registry and orchestrator never see concrete adapter types.

use crate::error::GatewayError;
use crate::request::ChatRequest;
use crate::response::ChatResponse;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Adapter between the normalized chat schema and one upstream API
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Stable provider key used for registration and lookup
    fn id(&self) -> &str;

    /// Provider type
    fn provider_type(&self) -> ProviderType;

    /// What the upstream accepts
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Run one chat completion against the upstream.
    ///
    /// The request is expected to be validated, defaulted and normalized.
    /// Exactly one network call is made (plus image fetches where the
    /// upstream needs inline bytes); failures are never retried.
    async fn chat_completion(
        &self,
        request: &ChatRequest,
        api_key: &SecretString,
    ) -> Result<ChatResponse, GatewayError>;
}

/// Supported upstreams, in their canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Groq
    #[default]
    Groq,
    /// OpenRouter
    OpenRouter,
    /// Google Gemini
    Gemini,
    /// Atlas Cloud
    Atlas,
    /// Chutes
    Chutes,
}

impl ProviderType {
    /// All supported providers in canonical order
    pub const ALL: [Self; 5] = [
        Self::Groq,
        Self::OpenRouter,
        Self::Gemini,
        Self::Atlas,
        Self::Chutes,
    ];

    /// Provider key
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenRouter => "openrouter",
            Self::Gemini => "gemini",
            Self::Atlas => "atlas",
            Self::Chutes => "chutes",
        }
    }

    /// Human-readable name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::OpenRouter => "OpenRouter",
            Self::Gemini => "Google Gemini",
            Self::Atlas => "Atlas Cloud",
            Self::Chutes => "Chutes",
        }
    }

    /// Environment variable holding the API key
    #[must_use]
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Atlas => "ATLASCLOUD_API_KEY",
            Self::Chutes => "CHUTES_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| GatewayError::invalid_provider(s))
    }
}

/// Provider capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Accepts multi-part messages
    pub structured_content: bool,
    /// Accepts image parts
    pub vision: bool,
    /// Accepts remote image URLs without inlining
    pub image_urls: bool,
}

impl ProviderCapabilities {
    /// Flat prompt only, images dropped
    #[must_use]
    pub fn text_only() -> Self {
        Self {
            structured_content: false,
            vision: false,
            image_urls: false,
        }
    }

    /// Structured parts with inline images
    #[must_use]
    pub fn vision() -> Self {
        Self {
            structured_content: true,
            vision: true,
            image_urls: false,
        }
    }

    /// Structured parts with remote image URLs forwarded as is
    #[must_use]
    pub fn vision_with_urls() -> Self {
        Self {
            image_urls: true,
            ..Self::vision()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parse() {
        assert_eq!("groq".parse::<ProviderType>().unwrap(), ProviderType::Groq);
        assert_eq!(
            "openrouter".parse::<ProviderType>().unwrap(),
            ProviderType::OpenRouter
        );
        assert!(matches!(
            "made_up".parse::<ProviderType>(),
            Err(GatewayError::InvalidProvider { .. })
        ));
        assert!("GROQ".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_canonical_order() {
        let keys: Vec<_> = ProviderType::ALL.iter().map(ProviderType::as_str).collect();
        assert_eq!(keys, ["groq", "openrouter", "gemini", "atlas", "chutes"]);
        assert_eq!(ProviderType::default(), ProviderType::Groq);
        assert_eq!(ProviderType::Atlas.api_key_env(), "ATLASCLOUD_API_KEY");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ProviderType::OpenRouter).unwrap();
        assert_eq!(json, "\"openrouter\"");
    }
}
