//! OpenRouter provider implementation.
//!
//! OpenRouter routes to many backends, not all of which can fetch remote
//! images, so every image is resolved locally and sent as a data URI.

use crate::config::ProviderConfig;
use crate::http::{build_client, send_json};
use crate::image::ImageResolver;
use crate::openai_compat::{chat_request, structured_messages, CompatRequest, CompatResponse, ImageMode};
use async_trait::async_trait;
use gateway_core::{
    ChatRequest, ChatResponse, GatewayError, LLMProvider, ProviderCapabilities, ProviderType,
};
use reqwest::Client;
use secrecy::SecretString;
use tracing::debug;

/// Attribution headers sent with every request
const REFERER: &str = "https://chat-completion-gateway";
const TITLE: &str = "Chat Completion Gateway";

/// OpenRouter provider implementation
pub struct OpenRouterProvider {
    config: ProviderConfig,
    client: Client,
    images: ImageResolver,
    capabilities: ProviderCapabilities,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: ProviderConfig) -> Result<Self, GatewayError> {
        let client = build_client(config.timeout)?;
        Ok(Self {
            images: ImageResolver::new(client.clone()),
            config,
            client,
            capabilities: ProviderCapabilities::vision(),
        })
    }

    /// Create a provider with built-in defaults
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn with_defaults() -> Result<Self, GatewayError> {
        Self::new(ProviderConfig::new(ProviderType::OpenRouter))
    }
}

#[async_trait]
impl LLMProvider for OpenRouterProvider {
    fn id(&self) -> &str {
        ProviderType::OpenRouter.as_str()
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenRouter
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
        let messages =
            structured_messages(self.id(), &request.messages, ImageMode::Inline(&self.images)).await?;
        let body = CompatRequest::new(model.clone(), messages, request);

        debug!(
            provider = self.id(),
            model = %model,
            "Sending chat completion request"
        );

        let http_request = chat_request(&self.client, &self.config, api_key, &body)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE);

        let response: CompatResponse = send_json(self.id(), http_request).await?;
        response.into_chat_response(self.id(), &model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ImageError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenRouterProvider {
        OpenRouterProvider::new(ProviderConfig::new(ProviderType::OpenRouter).with_base_url(server.uri()))
            .unwrap()
    }

    fn key() -> SecretString {
        SecretString::new("or-test".to_string())
    }

    #[tokio::test]
    async fn test_inlines_remote_image_and_sends_attribution() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dog.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"png".to_vec()),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("HTTP-Referer", REFERER))
            .and(header("X-Title", TITLE))
            .and(body_partial_json(serde_json::json!({
                "model": "google/gemini-2.5-flash-image-preview:free",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "what breed?"},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,cG5n"}}
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "gen-1",
                "created": 1_700_000_001,
                "model": "google/gemini-2.5-flash-image-preview:free",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "a corgi"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 20, "completion_tokens": 3, "total_tokens": 23}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut request =
            ChatRequest::new("what breed?").with_image_data(format!("{}/dog.png", server.uri()));
        request.normalize_messages();

        let response = provider(&server).chat_completion(&request, &key()).await.unwrap();
        assert_eq!(response.id, "gen-1");
        assert_eq!(response.content().as_deref(), Some("a corgi"));
    }

    #[tokio::test]
    async fn test_image_fetch_failure_stops_before_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut request =
            ChatRequest::new("what breed?").with_image_data(format!("{}/private.png", server.uri()));
        request.normalize_messages();

        let err = provider(&server).chat_completion(&request, &key()).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Image(ImageError::UpstreamFetch { status: 403 })
        ));
    }
}
