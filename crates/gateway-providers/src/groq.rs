//! Groq provider implementation.
//!
//! Groq serves an OpenAI-compatible API at `https://api.groq.com/openai/v1`
//! and fetches remote images itself, so image URLs are forwarded untouched.

use crate::config::ProviderConfig;
use crate::http::{build_client, send_json};
use crate::openai_compat::{chat_request, structured_messages, CompatRequest, CompatResponse, ImageMode};
use async_trait::async_trait;
use gateway_core::{
    ChatRequest, ChatResponse, GatewayError, LLMProvider, ProviderCapabilities, ProviderType,
};
use reqwest::Client;
use secrecy::SecretString;
use tracing::debug;

/// Groq provider implementation
pub struct GroqProvider {
    config: ProviderConfig,
    client: Client,
    capabilities: ProviderCapabilities,
}

impl GroqProvider {
    /// Create a new Groq provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: ProviderConfig) -> Result<Self, GatewayError> {
        let client = build_client(config.timeout)?;
        Ok(Self {
            config,
            client,
            capabilities: ProviderCapabilities::vision_with_urls(),
        })
    }

    /// Create a provider with built-in defaults
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn with_defaults() -> Result<Self, GatewayError> {
        Self::new(ProviderConfig::new(ProviderType::Groq))
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    fn id(&self) -> &str {
        ProviderType::Groq.as_str()
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Groq
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
        let messages = structured_messages(self.id(), &request.messages, ImageMode::Forward).await?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ChatMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GroqProvider {
        GroqProvider::new(ProviderConfig::new(ProviderType::Groq).with_base_url(server.uri())).unwrap()
    }

    fn key() -> SecretString {
        SecretString::new("gsk-test".to_string())
    }

    #[test]
    fn test_identity() {
        let provider = GroqProvider::with_defaults().unwrap();
        assert_eq!(provider.id(), "groq");
        assert_eq!(provider.provider_type(), ProviderType::Groq);
        assert!(provider.capabilities().image_urls);
    }

    #[tokio::test]
    async fn test_forwards_image_url_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "meta-llama/llama-4-maverick-17b-128e-instruct",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "describe"},
                        {"type": "image_url", "image_url": {"url": "https://images.test/cat.png"}}
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "created": 1_700_000_000,
                "model": "meta-llama/llama-4-maverick-17b-128e-instruct",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "a cat"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = ChatRequest::new("describe").with_image_data("https://images.test/cat.png");
        request.normalize_messages();

        let response = provider(&server).chat_completion(&request, &key()).await.unwrap();
        assert_eq!(response.content().as_deref(), Some("a cat"));
    }

    #[tokio::test]
    async fn test_omits_unset_generation_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-2",
                "created": 1,
                "model": "openai/gpt-oss-120b",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}, "finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            ..ChatRequest::default()
        };
        provider(&server).chat_completion(&request, &key()).await.unwrap();

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            ..ChatRequest::default()
        };
        let err = provider(&server).chat_completion(&request, &key()).await.unwrap_err();
        match err {
            GatewayError::Provider { status, body, .. } => {
                assert_eq!(status, Some(429));
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            ..ChatRequest::default()
        };
        let err = provider(&server).chat_completion(&request, &key()).await.unwrap_err();
        assert!(matches!(err, GatewayError::ResponseParse { .. }));
    }
}
