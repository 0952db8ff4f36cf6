//! Atlas Cloud provider implementation.
//!
//! Atlas Cloud's chat endpoint takes plain string content only; image parts
//! are dropped before sending.

use crate::config::ProviderConfig;
use crate::http::{build_client, send_json};
use crate::openai_compat::{chat_request, flatten_messages, CompatRequest, CompatResponse};
use async_trait::async_trait;
use gateway_core::{
    ChatRequest, ChatResponse, GatewayError, LLMProvider, ProviderCapabilities, ProviderType,
};
use reqwest::Client;
use secrecy::SecretString;
use tracing::debug;

/// Atlas Cloud provider implementation
pub struct AtlasProvider {
    config: ProviderConfig,
    client: Client,
    capabilities: ProviderCapabilities,
}

impl AtlasProvider {
    /// Create a new Atlas Cloud provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: ProviderConfig) -> Result<Self, GatewayError> {
        let client = build_client(config.timeout)?;
        Ok(Self {
            config,
            client,
            capabilities: ProviderCapabilities::text_only(),
        })
    }
}

#[async_trait]
impl LLMProvider for AtlasProvider {
    fn id(&self) -> &str {
        ProviderType::Atlas.as_str()
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Atlas
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn chat_completion(
        &self,
        request: &ChatRequest,
        api_key: &SecretString,
    ) -> Result<ChatResponse, GatewayError> {
        let model = self.config.resolve_model(request);
        let messages = flatten_messages(self.id(), &request.messages)?;
        let body = CompatRequest::new(model.clone(), messages, request);

        debug!(
            provider = self.id(),
            model = %model,
            "Sending chat completion request"
        );

        let response: CompatResponse =
            send_json(self.id(), chat_request(&self.client, &self.config, api_key, &body)).await?;

        response.into_chat_response(self.id(), &model)
    }
}
