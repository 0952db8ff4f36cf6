//! Chutes provider implementation.

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

/// Chutes provider implementation, flat text content only
pub struct ChutesProvider {
    config: ProviderConfig,
    client: Client,
    capabilities: ProviderCapabilities,
}

impl ChutesProvider {
    /// Create a new Chutes provider
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
impl LLMProvider for ChutesProvider {
    fn id(&self) -> &str {
        ProviderType::Chutes.as_str()
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Chutes
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

        debug!(provider = self.id(), model = %model, "Sending chat completion request");

        let response: CompatResponse =
            send_json(self.id(), chat_request(&self.client, &self.config, api_key, &body)).await?;

        response.into_chat_response(self.id(), &model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::TRUNCATED_RESPONSE_PLACEHOLDER;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_truncated_empty_reply_gets_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chutes-1",
                "created": 1_700_000_003,
                "model": "zai-org/GLM-4.5-FP8",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": ""}, "finish_reason": "length"}],
                "usage": {"prompt_tokens": 8, "completion_tokens": 16, "total_tokens": 24}
            })))
            .mount(&server)
            .await;

        let provider =
            ChutesProvider::new(ProviderConfig::new(ProviderType::Chutes).with_base_url(server.uri())).unwrap();

        let mut request = ChatRequest::new("write an essay");
        request.normalize_messages();

        let response = provider
            .chat_completion(&request, &SecretString::new("cpk-test".to_string()))
            .await
            .unwrap();
        assert_eq!(response.choices[0].finish_reason, "length");
        assert_eq!(response.choices[0].message.text(), TRUNCATED_RESPONSE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_transport_failure_has_no_status() {
        let provider = ChutesProvider::new(
            ProviderConfig::new(ProviderType::Chutes).with_base_url("http://127.0.0.1:1"),
        )
        .unwrap();

        let mut request = ChatRequest::new("hi");
        request.normalize_messages();

        let err = provider
            .chat_completion(&request, &SecretString::new("cpk-test".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Provider { status: None, .. }));
    }
}
