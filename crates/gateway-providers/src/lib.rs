//! # Gateway Providers
//!
//! Upstream adapters for the chat completion gateway.
//!
//! This crate provides implementations for the supported upstreams:
//! - Groq (OpenAI-compatible, remote image URLs forwarded as is)
//! - OpenRouter (OpenAI-compatible, images inlined as data URIs)
//! - Google Gemini (`generateContent`, images inlined as `inlineData`)
//! - Atlas Cloud (OpenAI-compatible, flat text only)
//! - Chutes (OpenAI-compatible, flat text only)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod image;
pub mod registry;

mod http;
mod openai_compat;

#[cfg(feature = "groq")]
pub mod groq;

#[cfg(feature = "openrouter")]
pub mod openrouter;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "atlas")]
pub mod atlas;

#[cfg(feature = "chutes")]
pub mod chutes;

// Re-export main types
pub use config::ProviderConfig;
pub use image::{parse_data_uri, ImageResolver, ResolvedImage};
pub use registry::ProviderRegistry;

#[cfg(feature = "groq")]
pub use groq::GroqProvider;

#[cfg(feature = "openrouter")]
pub use openrouter::OpenRouterProvider;

#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;

#[cfg(feature = "atlas")]
pub use atlas::AtlasProvider;

#[cfg(feature = "chutes")]
pub use chutes::ChutesProvider;
