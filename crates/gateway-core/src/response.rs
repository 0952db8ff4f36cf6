//! Response types for the gateway.

use crate::request::ChatMessage;
use serde::{Deserialize, Serialize};

/// Text substituted when an upstream truncates a reply down to nothing
pub const TRUNCATED_RESPONSE_PLACEHOLDER: &str = "The response was terminated early due to the 'max_tokens' limit. Please try increasing the max_tokens parameter.";

/// Normalized, OpenAI-style chat completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response identifier
    pub id: String,

    /// Object kind, `chat.completion`
    pub object: String,

    /// Creation time in epoch seconds
    pub created: i64,

    /// Model that served the request
    pub model: String,

    /// Completion choices
    pub choices: Vec<Choice>,

    /// Token usage
    pub usage: Usage,
}

impl ChatResponse {
    /// Object kind reported for every response
    pub const OBJECT: &'static str = "chat.completion";

    /// Text of the first choice, if any
    #[must_use]
    pub fn content(&self) -> Option<String> {
        self.choices.first().map(|choice| choice.message.text())
    }
}

/// A single completion choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Position in the returned list
    pub index: u32,

    /// Assistant message
    pub message: ChatMessage,

    /// Lower-cased finish reason
    pub finish_reason: String,
}

impl Choice {
    /// Build a choice from assistant text.
    ///
    /// Empty text on a truncated completion becomes
    /// [`TRUNCATED_RESPONSE_PLACEHOLDER`].
    #[must_use]
    pub fn assistant(index: u32, content: impl Into<String>, finish_reason: &str) -> Self {
        let finish_reason = finish_reason.to_lowercase();
        let mut content = content.into();
        if content.is_empty() && is_truncation(&finish_reason) {
            content = TRUNCATED_RESPONSE_PLACEHOLDER.to_string();
        }
        Self {
            index,
            message: ChatMessage::assistant(content),
            finish_reason,
        }
    }
}

fn is_truncation(finish_reason: &str) -> bool {
    matches!(finish_reason, "length" | "max_tokens")
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

impl Usage {
    /// Create usage counters
    #[must_use]
    pub fn new(prompt_tokens: u32, completion_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}
