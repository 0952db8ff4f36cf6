//! Credential lookup used by the orchestrator.

use crate::provider::ProviderType;
use secrecy::{ExposeSecret, SecretString};

/// Source of per-provider API keys and the supported provider set
pub trait CredentialStore: Send + Sync {
    /// API key for the provider, `None` when unset or empty
    fn api_key(&self, provider: &str) -> Option<SecretString>;

    /// Supported provider keys in canonical order
    fn supported_providers(&self) -> Vec<String> {
        ProviderType::ALL
            .iter()
            .map(|provider| provider.as_str().to_string())
            .collect()
    }

    /// Whether the identifier is a supported provider
    fn is_valid_provider(&self, provider: &str) -> bool {
        self.supported_providers().iter().any(|p| p == provider)
    }

    /// Whether any supported provider has a key
    fn has_any_api_key(&self) -> bool {
        self.supported_providers()
            .iter()
            .any(|provider| self.api_key(provider).is_some())
    }
}

/// Treat blank secrets as absent
#[must_use]
pub fn non_empty(secret: Option<&SecretString>) -> Option<SecretString> {
    secret
        .filter(|key| !key.expose_secret().trim().is_empty())
        .map(|key| SecretString::new(key.expose_secret().clone()))
}
