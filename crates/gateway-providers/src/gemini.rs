//! Google Gemini provider implementation.
//!
//! Talks to the Google AI Studio API:
//! `POST {base_url}/models/{model}:generateContent?key={api_key}`
//!
//! Gemini needs image bytes inline, puts system prompts in
//! `systemInstruction`, and calls the assistant role `model`. It returns
//! no id or timestamp, so both are generated here.

use crate::config::ProviderConfig;
use crate::http::{build_client, send_json};
use crate::image::ImageResolver;
use async_trait::async_trait;
use gateway_core::{
    ChatMessage, ChatRequest, ChatResponse, Choice, ContentPart, GatewayError, LLMProvider,
    MessageRole, ProviderCapabilities, ProviderType, Usage,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Harm categories relaxed on every request
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

/// Google Gemini provider implementation
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
    images: ImageResolver,
    capabilities: ProviderCapabilities,
}

impl GeminiProvider {
    /// Create a new Gemini provider
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
        Self::new(ProviderConfig::new(ProviderType::Gemini))
    }

    fn endpoint_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, model)
    }

    /// Transform a gateway request to Gemini's format
    async fn transform_request(&self, request: &ChatRequest) -> Result<GeminiRequest, GatewayError> {
        let mut contents = Vec::with_capacity(request.messages.len());
        let mut system_texts = Vec::new();

        for message in &request.messages {
            if message.role == MessageRole::System {
                let text = message.text();
                if !text.trim().is_empty() {
                    system_texts.push(text);
                }
                continue;
            }

            let parts = self.transform_parts(message).await?;
            if parts.is_empty() {
                continue;
            }

            let role = match message.role {
                MessageRole::Assistant => "model",
                _ => "user",
            };
            contents.push(GeminiContent {
                role: Some(role),
                parts,
            });
        }

        if contents.is_empty() {
            return Err(GatewayError::request_build(
                self.id(),
                "no valid content found in the request messages",
            ));
        }

        let system_instruction = (!system_texts.is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text {
                text: system_texts.join("\n"),
            }],
        });

        let generation_config = (request.temperature.is_some() || request.max_tokens.is_some())
            .then_some(GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            });

        Ok(GeminiRequest {
            contents,
            system_instruction,
            generation_config,
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| GeminiSafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        })
    }

    async fn transform_parts(&self, message: &ChatMessage) -> Result<Vec<GeminiPart>, GatewayError> {
        let mut parts = Vec::with_capacity(message.content.len());
        for part in &message.content {
            match part {
                ContentPart::Text { text } if text.trim().is_empty() => {}
                ContentPart::Text { text } => parts.push(GeminiPart::Text { text: text.clone() }),
                ContentPart::Image { image_url } => {
                    let image = self.images.resolve(image_url).await?;
                    parts.push(GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: image.mime_type,
                            data: image.data,
                        },
                    });
                }
            }
        }
        Ok(parts)
    }

    /// Transform Gemini response to gateway format
    fn transform_response(&self, response: GeminiResponse, model: &str) -> Result<ChatResponse, GatewayError> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone())
        {
            warn!(provider = self.id(), reason = %reason, "Prompt blocked by safety filters");
            return Err(GatewayError::content_filtered(self.id(), reason));
        }

        if response.candidates.is_empty() {
            return Err(GatewayError::response_parse(self.id(), "no candidates in response"));
        }

        let all_filtered = response.candidates.iter().all(|candidate| {
            candidate.text().is_empty()
                && matches!(
                    candidate.finish_reason.as_deref(),
                    Some("SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII")
                )
        });
        if all_filtered {
            let reason = response.candidates[0]
                .finish_reason
                .clone()
                .unwrap_or_default();
            warn!(provider = self.id(), reason = %reason, "Response blocked by safety filters");
            return Err(GatewayError::content_filtered(self.id(), reason));
        }

        let choices = response
            .candidates
            .iter()
            .enumerate()
            .map(|(position, candidate)| {
                Choice::assistant(
                    candidate.index.unwrap_or(position as u32),
                    candidate.text(),
                    candidate.finish_reason.as_deref().unwrap_or("stop"),
                )
            })
            .collect();

        let usage = response
            .usage_metadata
            .map(|u| Usage::new(u.prompt_token_count, u.candidates_token_count, u.total_token_count))
            .unwrap_or_default();

        Ok(ChatResponse {
            id: format!("gemini-{}", uuid::Uuid::new_v4()),
            object: ChatResponse::OBJECT.to_string(),
            created: chrono::Utc::now().timestamp(),
            model: response.model_version.unwrap_or_else(|| model.to_string()),
            choices,
            usage,
        })
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn id(&self) -> &str {
        ProviderType::Gemini.as_str()
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Gemini
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
        let url = self.endpoint_url(&model);
        let gemini_request = self.transform_request(request).await?;

        debug!(
            provider = self.id(),
            model = %model,
            url = %url,
            "Sending chat completion request"
        );

        let http_request = self
            .client
            .post(&url)
            .query(&[("key", api_key.expose_secret().as_str())])
            .json(&gemini_request);

        let response: GeminiResponse = send_json(self.id(), http_request).await?;
        self.transform_response(response, &model)
    }
}

// Gemini API Types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    safety_settings: Vec<GeminiSafetySetting>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    index: Option<u32>,
}

impl GeminiCandidate {
    fn text(&self) -> String {
        self.content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}
