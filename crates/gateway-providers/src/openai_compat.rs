//! Wire format shared by the OpenAI-compatible upstreams.
//!
//! Groq, OpenRouter, Atlas Cloud and Chutes all speak `/chat/completions`.
//! They differ in how much of the content model they accept, which is
//! decided by the caller through [`flatten_messages`] or
//! [`structured_messages`].

use crate::config::ProviderConfig;
use crate::image::ImageResolver;
use gateway_core::{
    ChatMessage, ChatRequest, ChatResponse, Choice, ContentPart, GatewayError, ImageReference,
    Usage,
};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How image parts reach the upstream
#[derive(Debug, Clone, Copy)]
pub(crate) enum ImageMode<'a> {
    /// URLs and data URIs are sent as is; bare base64 becomes a data URI
    Forward,
    /// Every image is resolved and sent as a data URI
    Inline(&'a ImageResolver),
}

/// Collapse each message to plain text, dropping image parts.
pub(crate) fn flatten_messages(
    provider: &str,
    messages: &[ChatMessage],
) -> Result<Vec<CompatMessage>, GatewayError> {
    let dropped: usize = messages
        .iter()
        .map(|m| m.content.iter().filter(|p| p.is_image()).count())
        .sum();
    if dropped > 0 {
        warn!(provider = provider, dropped = dropped, "Upstream accepts text only, dropping image parts");
    }

    let flattened: Vec<CompatMessage> = messages
        .iter()
        .filter_map(|message| {
            let text = message.text();
            (!text.trim().is_empty()).then(|| CompatMessage {
                role: message.role.as_str(),
                content: CompatContent::Text(text),
            })
        })
        .collect();

    if flattened.is_empty() {
        return Err(GatewayError::request_build(provider, "no text content to send"));
    }
    Ok(flattened)
}

/// Translate messages into multi-part content.
///
/// Messages without images keep plain string content, which every
/// OpenAI-compatible upstream accepts for every role.
pub(crate) async fn structured_messages(
    provider: &str,
    messages: &[ChatMessage],
    images: ImageMode<'_>,
) -> Result<Vec<CompatMessage>, GatewayError> {
    let mut translated = Vec::with_capacity(messages.len());

    for message in messages {
        if !message.has_image() {
            let text = message.text();
            if !text.trim().is_empty() {
                translated.push(CompatMessage {
                    role: message.role.as_str(),
                    content: CompatContent::Text(text),
                });
            }
            continue;
        }

        let mut parts = Vec::with_capacity(message.content.len());
        for part in &message.content {
            match part {
                ContentPart::Text { text } if text.trim().is_empty() => {}
                ContentPart::Text { text } => parts.push(CompatPart::Text { text: text.clone() }),
                ContentPart::Image { image_url } => {
                    let url = image_url_for(image_url, images).await?;
                    parts.push(CompatPart::ImageUrl {
                        image_url: CompatImageUrl { url },
                    });
                }
            }
        }

        translated.push(CompatMessage {
            role: message.role.as_str(),
            content: CompatContent::Parts(parts),
        });
    }

    if translated.is_empty() {
        return Err(GatewayError::request_build(provider, "no content to send"));
    }
    Ok(translated)
}

async fn image_url_for(reference: &ImageReference, images: ImageMode<'_>) -> Result<String, GatewayError> {
    match (images, reference) {
        (ImageMode::Forward, ImageReference::Url { url }) => Ok(url.clone()),
        (ImageMode::Forward, ImageReference::Inline { data, mime_type }) => {
            Ok(format!("data:{mime_type};base64,{data}"))
        }
        (ImageMode::Inline(resolver), reference) => {
            Ok(resolver.resolve(reference).await?.to_data_uri())
        }
    }
}

/// POST `{base_url}/chat/completions` with bearer auth
pub(crate) fn chat_request(
    client: &Client,
    config: &ProviderConfig,
    api_key: &SecretString,
    body: &CompatRequest,
) -> RequestBuilder {
    client
        .post(format!("{}/chat/completions", config.base_url))
        .bearer_auth(api_key.expose_secret())
        .json(body)
}

#[derive(Debug, Serialize)]
pub(crate) struct CompatRequest {
    model: String,
    messages: Vec<CompatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl CompatRequest {
    pub(crate) fn new(model: String, messages: Vec<CompatMessage>, request: &ChatRequest) -> Self {
        Self {
            model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CompatMessage {
    role: &'static str,
    content: CompatContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CompatContent {
    Text(String),
    Parts(Vec<CompatPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CompatPart {
    Text { text: String },
    ImageUrl { image_url: CompatImageUrl },
}

#[derive(Debug, Serialize)]
struct CompatImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompatResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<CompatChoice>,
    #[serde(default)]
    usage: Option<CompatUsage>,
}

#[derive(Debug, Deserialize)]
struct CompatChoice {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    message: Option<CompatResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl CompatResponse {
    /// Map into the gateway response, passing id, timestamp and model through
    pub(crate) fn into_chat_response(self, provider: &str, model: &str) -> Result<ChatResponse, GatewayError> {
        if self.choices.is_empty() {
            return Err(GatewayError::response_parse(provider, "no choices in response"));
        }

        let choices = self
            .choices
            .into_iter()
            .enumerate()
            .map(|(position, choice)| {
                let content = choice.message.and_then(|m| m.content).unwrap_or_default();
                let finish_reason = choice.finish_reason.unwrap_or_else(|| "stop".to_string());
                Choice::assistant(
                    choice.index.unwrap_or(position as u32),
                    content,
                    &finish_reason,
                )
            })
            .collect();

        let usage = self
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens))
            .unwrap_or_default();

        Ok(ChatResponse {
            id: self
                .id
                .unwrap_or_else(|| format!("chatcmpl-{}", uuid::Uuid::new_v4())),
            object: ChatResponse::OBJECT.to_string(),
            created: self.created.unwrap_or_else(|| chrono::Utc::now().timestamp()),
            model: self.model.unwrap_or_else(|| model.to_string()),
            choices,
            usage,
        })
    }
}
