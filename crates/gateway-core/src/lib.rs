//! # Gateway Core
//!
//! Core types, traits, and error handling for the chat completion gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - The normalized request and content model
//! - The OpenAI-style response model
//! - The provider adapter trait and provider identifiers
//! - The credential lookup trait implemented by configuration
//! - Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod error;
pub mod provider;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use credentials::CredentialStore;
pub use error::{GatewayError, GatewayResult, ImageError};
pub use provider::{LLMProvider, ProviderCapabilities, ProviderType};
pub use request::{
    ChatMessage, ChatRequest, ContentPart, ImageReference, MessageRole, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, DEFAULT_IMAGE_MIME_TYPE,
};
pub use response::{ChatResponse, Choice, Usage, TRUNCATED_RESPONSE_PLACEHOLDER};
