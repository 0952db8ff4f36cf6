//! Chat completion orchestration.
//!
//! [`ChatService`] owns the request pipeline: validate, fill defaults,
//! normalize messages, pick the provider, fetch its key, look up the adapter
//! and invoke it. Adapter errors pass through untouched; the service only
//! tags them with the [`Stage`] that failed.

use chrono::{DateTime, Utc};
use gateway_core::{ChatRequest, ChatResponse, CredentialStore, GatewayError, ProviderType};
use gateway_providers::ProviderRegistry;
use gateway_telemetry::provider_span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, Instrument};

/// Pipeline step at which a chat completion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Request content checks
    Validate,
    /// API key lookup
    ResolveApiKey,
    /// Adapter lookup
    LookupProvider,
    /// Upstream call
    Complete,
}

impl Stage {
    /// Stable stage name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::ResolveApiKey => "resolve_api_key",
            Self::LookupProvider => "lookup_provider",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`GatewayError`] tagged with the stage that produced it
#[derive(Debug, thiserror::Error)]
#[error("{stage}: {error}")]
pub struct ServiceError {
    /// Failing stage
    pub stage: Stage,
    /// Underlying error, unchanged
    #[source]
    pub error: GatewayError,
}

impl ServiceError {
    /// Tag an error with a stage
    #[must_use]
    pub fn new(stage: Stage, error: GatewayError) -> Self {
        Self { stage, error }
    }
}

/// Service health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// `healthy` or `degraded`
    pub status: String,
    /// Time of the check
    pub timestamp: DateTime<Utc>,
    /// Per-service status
    pub services: BTreeMap<String, String>,
}

/// Supported providers listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersResponse {
    /// Provider keys in canonical order
    pub providers: Vec<String>,
    /// Provider used when a request names none
    pub default: String,
}

/// Outcome of a local provider check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Blank provider identifier
    InvalidRequest,
    /// Not a supported provider
    InvalidProvider,
    /// Supported but no key configured
    NoApiKey,
    /// Supported with a key configured
    Healthy,
}

/// Provider test request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderTestRequest {
    /// Provider to check
    #[serde(default)]
    pub provider: String,
}

/// Provider test result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTestResult {
    /// Provider as given
    pub provider: String,
    /// Check outcome
    pub status: ProviderStatus,
}

/// Chat completion orchestrator
pub struct ChatService {
    registry: Arc<ProviderRegistry>,
    credentials: Arc<dyn CredentialStore>,
    default_provider: String,
}

impl ChatService {
    /// Create a service over a registry and a credential source
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            registry,
            credentials,
            default_provider: ProviderType::default().as_str().to_string(),
        }
    }

    /// Override the provider used when a request names none
    #[must_use]
    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    /// Provider used when a request names none
    #[must_use]
    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Provider a request will be routed to
    #[must_use]
    pub fn provider_for<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        request
            .provider
            .as_deref()
            .map(str::trim)
            .filter(|provider| !provider.is_empty())
            .unwrap_or(self.default_provider.as_str())
    }

    /// Run a chat completion end to end
    ///
    /// # Errors
    /// Returns the first failing stage and its error
    pub async fn process_chat_completion(
        &self,
        mut request: ChatRequest,
    ) -> Result<ChatResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| self.fail(Stage::Validate, e))?;

        request.apply_defaults();
        request.normalize_messages();

        let provider_id = self.provider_for(&request).to_string();

        let api_key = self
            .credentials
            .api_key(&provider_id)
            .ok_or_else(|| self.fail(Stage::ResolveApiKey, GatewayError::missing_api_key(&provider_id)))?;

        let provider = self
            .registry
            .lookup(&provider_id)
            .map_err(|e| self.fail(Stage::LookupProvider, e))?;

        let model = request.model.as_deref().unwrap_or_default();
        debug!(
            provider = %provider_id,
            messages = request.messages.len(),
            has_image = request.contains_image(),
            "Dispatching chat completion"
        );

        let response = provider
            .chat_completion(&request, &api_key)
            .instrument(provider_span!(provider_id, model))
            .await
            .map_err(|e| self.fail(Stage::Complete, e))?;

        info!(
            provider = %provider_id,
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Chat completion succeeded"
        );

        Ok(response)
    }

    /// Report service health; degraded when no provider has a key
    #[must_use]
    pub fn health_status(&self) -> HealthReport {
        let has_key = self.credentials.has_any_api_key();
        let (status, chat) = if has_key {
            ("healthy", "healthy")
        } else {
            ("degraded", "no_api_keys")
        };

        HealthReport {
            status: status.to_string(),
            timestamp: Utc::now(),
            services: BTreeMap::from([("chat".to_string(), chat.to_string())]),
        }
    }

    /// Supported providers in canonical order
    #[must_use]
    pub fn supported_providers(&self) -> ProvidersResponse {
        ProvidersResponse {
            providers: self.credentials.supported_providers(),
            default: self.default_provider.clone(),
        }
    }

    /// Check a provider locally, without calling it
    #[must_use]
    pub fn test_provider(&self, provider: &str) -> ProviderTestResult {
        let status = if provider.trim().is_empty() {
            ProviderStatus::InvalidRequest
        } else if !self.credentials.is_valid_provider(provider) {
            ProviderStatus::InvalidProvider
        } else if self.credentials.api_key(provider).is_none() {
            ProviderStatus::NoApiKey
        } else {
            ProviderStatus::Healthy
        };

        ProviderTestResult {
            provider: provider.to_string(),
            status,
        }
    }

    fn fail(&self, stage: Stage, error: GatewayError) -> ServiceError {
        error!(
            stage = %stage,
            error_type = error.error_type(),
            error = %error,
            "Chat completion failed"
        );
        ServiceError::new(stage, error)
    }
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService")
            .field("registry", &self.registry)
            .field("default_provider", &self.default_provider)
            .finish_non_exhaustive()
    }
}
