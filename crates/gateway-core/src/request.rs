//! Request types for the gateway.
//!
//! This module defines the provider-agnostic request accepted by the gateway
//! and the message/content model every adapter translates from.

use crate::error::GatewayError;
use serde::{Deserialize, Deserializer, Serialize};

/// Sampling temperature applied when the caller omits one
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Output token limit applied when the caller omits one
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Mime type assumed for bare base64 image attachments
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Provider-agnostic chat completion request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Prompt text, optional when messages or an image are supplied
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,

    /// Pre-built message list, used verbatim when non-empty
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub messages: Vec<ChatMessage>,

    /// Target model (provider-specific meaning)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Streaming flag, accepted but not honoured
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream: bool,

    /// Provider identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Whether `image_data` carries an attachment
    #[serde(default, alias = "withImage", deserialize_with = "null_as_default")]
    pub with_image: bool,

    /// Data URI, http(s) URL, or bare base64 image payload
    #[serde(
        default,
        alias = "imageData",
        alias = "image",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_data: Option<String>,
}

impl ChatRequest {
    /// Create a prompt-only request
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Set the provider
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attach an image reference
    #[must_use]
    pub fn with_image_data(mut self, image_data: impl Into<String>) -> Self {
        self.with_image = true;
        self.image_data = Some(image_data.into());
        self
    }

    /// Whether an image is attached to the request itself
    #[must_use]
    pub fn has_image_attachment(&self) -> bool {
        self.with_image
            && self
                .image_data
                .as_deref()
                .is_some_and(|data| !data.trim().is_empty())
    }

    /// Whether any message (or the attachment) carries an image part
    #[must_use]
    pub fn contains_image(&self) -> bool {
        self.has_image_attachment() || self.messages.iter().any(ChatMessage::has_image)
    }

    /// Validate the request
    ///
    /// # Errors
    /// Returns `InvalidRequest` when there is no prompt, no attached image,
    /// and no pre-built message list.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.prompt.trim().is_empty() && !self.has_image_attachment() && self.messages.is_empty()
        {
            return Err(GatewayError::invalid_request(
                "prompt or image is required",
            ));
        }
        Ok(())
    }

    /// Fill in temperature and max_tokens when absent
    pub fn apply_defaults(&mut self) {
        self.temperature.get_or_insert(DEFAULT_TEMPERATURE);
        self.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    }

    /// Image reference built from the attachment, if any
    #[must_use]
    pub fn attached_image(&self) -> Option<ImageReference> {
        if !self.has_image_attachment() {
            return None;
        }
        self.image_data
            .as_deref()
            .map(|data| ImageReference::from_attachment(data.trim()))
    }

    /// Replace the message list with the normalized one.
    ///
    /// A non-empty pre-built list is kept as is. Otherwise a single user
    /// message is assembled from the prompt text followed by the image.
    pub fn normalize_messages(&mut self) {
        if !self.messages.is_empty() {
            return;
        }

        let mut parts = Vec::with_capacity(2);
        if !self.prompt.trim().is_empty() {
            parts.push(ContentPart::text(self.prompt.clone()));
        }
        if let Some(image) = self.attached_image() {
            parts.push(ContentPart::image(image));
        }

        self.messages = vec![ChatMessage::new(MessageRole::User, parts)];
    }
}

/// Chat message with role and ordered content parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireMessage", into = "WireMessage")]
pub struct ChatMessage {
    /// Role of the message author
    pub role: MessageRole,

    /// Ordered content parts
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// Create a message from parts
    #[must_use]
    pub fn new(role: MessageRole, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, vec![ContentPart::text(content)])
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, vec![ContentPart::text(content)])
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, vec![ContentPart::text(content)])
    }

    /// Text parts joined with newlines
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any part is an image
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.content.iter().any(ContentPart::is_image)
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content part
    Text {
        /// The text content
        text: String,
    },
    /// Image content part
    #[serde(rename = "image_url")]
    Image {
        /// Image reference
        image_url: ImageReference,
    },
}

impl ContentPart {
    /// Create a text part
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part
    #[must_use]
    pub fn image(image_url: ImageReference) -> Self {
        Self::Image { image_url }
    }

    /// Text of a text part
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }

    /// Whether this is an image part
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Reference to image content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageReference {
    /// Data URI or http(s) URL
    Url {
        /// The reference string
        url: String,
    },
    /// Bare base64 payload with an assumed mime type
    Inline {
        /// Base64 payload
        data: String,
        /// Mime type of the payload
        mime_type: String,
    },
}

impl ImageReference {
    /// Create a URL reference
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    /// Interpret a raw attachment string.
    ///
    /// Data URIs and http(s) URLs become [`ImageReference::Url`]; anything
    /// else is taken as bare base64 in [`DEFAULT_IMAGE_MIME_TYPE`].
    #[must_use]
    pub fn from_attachment(raw: &str) -> Self {
        if raw.starts_with("data:") || raw.starts_with("http://") || raw.starts_with("https://") {
            Self::url(raw)
        } else {
            Self::Inline {
                data: raw.to_string(),
                mime_type: DEFAULT_IMAGE_MIME_TYPE.to_string(),
            }
        }
    }

    /// Whether this is a remote http(s) URL
    #[must_use]
    pub fn is_remote(&self) -> bool {
        match self {
            Self::Url { url } => url.starts_with("http://") || url.starts_with("https://"),
            Self::Inline { .. } => false,
        }
    }
}

/// Message content as it appears on the wire
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: MessageRole,
    content: MessageContent,
}

impl From<WireMessage> for ChatMessage {
    fn from(wire: WireMessage) -> Self {
        let content = match wire.content {
            MessageContent::Text(text) => vec![ContentPart::Text { text }],
            MessageContent::Parts(parts) => parts,
        };
        Self {
            role: wire.role,
            content,
        }
    }
}

impl From<ChatMessage> for WireMessage {
    fn from(message: ChatMessage) -> Self {
        let content = match message.content.as_slice() {
            [ContentPart::Text { text }] => MessageContent::Text(text.clone()),
            _ => MessageContent::Parts(message.content),
        };
        Self {
            role: message.role,
            content,
        }
    }
}
