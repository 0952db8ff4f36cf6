//! Provider registry.
//!
//! Maps provider identifiers to adapter handles. The registry is filled once
//! at startup and read concurrently afterwards; it never exposes concrete
//! adapter types, so a new upstream needs only a new [`LLMProvider`] impl.

use crate::config::ProviderConfig;
use dashmap::DashMap;
use gateway_config::ProvidersConfig;
use gateway_core::{GatewayError, LLMProvider, ProviderType};
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of provider adapters keyed by [`LLMProvider::id`]
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every supported adapter
    ///
    /// # Errors
    /// Returns error if an adapter cannot be constructed
    pub fn from_config(config: &ProvidersConfig) -> Result<Self, GatewayError> {
        let registry = Self::new();
        registry.initialize(config)?;
        Ok(registry)
    }

    /// Construct and register the supported adapters
    ///
    /// # Errors
    /// Returns error if an adapter cannot be constructed
    pub fn initialize(&self, config: &ProvidersConfig) -> Result<(), GatewayError> {
        for provider_type in ProviderType::ALL {
            let provider_config = ProviderConfig::from_settings(
                provider_type,
                config.settings(provider_type),
                config.timeout,
            );
            if let Some(provider) = build_provider(provider_config)? {
                self.register(provider);
            }
        }

        info!(providers = self.len(), "Provider registry initialized");
        Ok(())
    }

    /// Register an adapter, replacing any previous one with the same id
    pub fn register(&self, provider: Arc<dyn LLMProvider>) -> Option<Arc<dyn LLMProvider>> {
        let id = provider.id().to_string();
        debug!(provider = %id, "Registering provider");
        self.providers.insert(id, provider)
    }

    /// Look up an adapter
    ///
    /// # Errors
    /// Returns `UnknownProvider` if nothing is registered under `id`
    pub fn lookup(&self, id: &str) -> Result<Arc<dyn LLMProvider>, GatewayError> {
        self.get(id).ok_or_else(|| GatewayError::unknown_provider(id))
    }

    /// Get an adapter if registered
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether an adapter is registered under `id`
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Registered ids, sorted
    #[must_use]
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of registered adapters
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_ids())
            .finish()
    }
}

/// Adapter for a provider type, `None` when its feature is disabled
#[allow(clippy::unnecessary_wraps)]
fn build_provider(config: ProviderConfig) -> Result<Option<Arc<dyn LLMProvider>>, GatewayError> {
    let provider: Arc<dyn LLMProvider> = match config.provider {
        #[cfg(feature = "groq")]
        ProviderType::Groq => Arc::new(crate::groq::GroqProvider::new(config)?),
        #[cfg(feature = "openrouter")]
        ProviderType::OpenRouter => Arc::new(crate::openrouter::OpenRouterProvider::new(config)?),
        #[cfg(feature = "gemini")]
        ProviderType::Gemini => Arc::new(crate::gemini::GeminiProvider::new(config)?),
        #[cfg(feature = "atlas")]
        ProviderType::Atlas => Arc::new(crate::atlas::AtlasProvider::new(config)?),
        #[cfg(feature = "chutes")]
        ProviderType::Chutes => Arc::new(crate::chutes::ChutesProvider::new(config)?),
        #[allow(unreachable_patterns)]
        _ => return Ok(None),
    };
    Ok(Some(provider))
}
