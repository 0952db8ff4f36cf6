//! Error types for the gateway.
//!
//! Every failure a chat completion can hit is a [`GatewayError`]. Adapters
//! produce them, the orchestrator tags them with the failing stage, and the
//! HTTP layer maps them onto status codes via [`GatewayError::status_code`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client input failed validation
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message
        message: String,
    },

    /// No adapter is registered under the identifier
    #[error("Unknown provider: {provider}")]
    UnknownProvider {
        /// Provider identifier
        provider: String,
    },

    /// Identifier is not one of the supported providers
    #[error("Invalid provider: {provider}")]
    InvalidProvider {
        /// Provider identifier
        provider: String,
    },

    /// No API key is configured for the provider
    #[error("API key not configured for provider: {provider}")]
    MissingApiKey {
        /// Provider identifier
        provider: String,
    },

    /// The request could not be translated into the provider's payload
    #[error("Failed to build request for {provider}: {message}")]
    RequestBuild {
        /// Provider identifier
        provider: String,
        /// Error message
        message: String,
    },

    /// An image reference could not be resolved
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The upstream returned a non-success status or was unreachable
    #[error("Provider {provider} error{}: {body}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Provider {
        /// Provider identifier
        provider: String,
        /// Upstream HTTP status, absent on transport failure
        status: Option<u16>,
        /// Upstream response body or transport error text
        body: String,
    },

    /// The upstream body did not match the expected schema
    #[error("Failed to parse {provider} response: {message}")]
    ResponseParse {
        /// Provider identifier
        provider: String,
        /// Error message
        message: String,
    },

    /// The upstream refused the prompt on safety grounds
    #[error("Content filtered by {provider}: {reason}")]
    ContentFiltered {
        /// Provider identifier
        provider: String,
        /// Block reason reported upstream
        reason: String,
    },

    /// The outer request deadline elapsed
    #[error("Request timed out after {after:?}")]
    Timeout {
        /// Deadline that elapsed
        after: Duration,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

impl GatewayError {
    /// Create an invalid request error
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an unknown provider error
    #[must_use]
    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        Self::UnknownProvider {
            provider: provider.into(),
        }
    }

    /// Create an invalid provider error
    #[must_use]
    pub fn invalid_provider(provider: impl Into<String>) -> Self {
        Self::InvalidProvider {
            provider: provider.into(),
        }
    }

    /// Create a missing API key error
    #[must_use]
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Create a request build error
    #[must_use]
    pub fn request_build(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RequestBuild {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a provider error
    #[must_use]
    pub fn provider(provider: impl Into<String>, status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a response parse error
    #[must_use]
    pub fn response_parse(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseParse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a content filtered error
    #[must_use]
    pub fn content_filtered(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status code this error surfaces as
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. }
            | Self::UnknownProvider { .. }
            | Self::InvalidProvider { .. }
            | Self::MissingApiKey { .. }
            | Self::RequestBuild { .. } => 400,
            Self::Image(e) => e.status_code(),
            Self::Provider { .. } | Self::ResponseParse { .. } => 502,
            Self::ContentFiltered { .. } => 422,
            Self::Timeout { .. } => 504,
            Self::Configuration { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Machine-readable error type
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::UnknownProvider { .. } => "unknown_provider",
            Self::InvalidProvider { .. } => "invalid_provider",
            Self::MissingApiKey { .. } => "missing_api_key",
            Self::RequestBuild { .. } => "request_build_error",
            Self::Image(e) => e.error_type(),
            Self::Provider { .. } => "provider_error",
            Self::ResponseParse { .. } => "response_parse_error",
            Self::ContentFiltered { .. } => "content_filtered",
            Self::Timeout { .. } => "timeout",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Upstream HTTP status attached to the error, if any
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => *status,
            Self::Image(ImageError::UpstreamFetch { status }) => Some(*status),
            _ => None,
        }
    }
}

/// Failures while turning an image reference into inline bytes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// A `data:` URI without a comma or a `;base64` marker
    #[error("Malformed data URI")]
    MalformedDataUri,

    /// The image URL answered with a non-success status
    #[error("Failed to fetch image: upstream returned status {status}")]
    UpstreamFetch {
        /// HTTP status returned by the image host
        status: u16,
    },

    /// The image host could not be reached or the body could not be read
    #[error("Failed to fetch image: {message}")]
    FetchTransport {
        /// Transport error text
        message: String,
    },

    /// The fetched resource declared a non-image content type
    #[error("Resource is not an image (content type {content_type})")]
    NotAnImage {
        /// Declared content type
        content_type: String,
    },

    /// The reference is neither a data URI nor an http(s) URL
    #[error("Unsupported image reference")]
    UnsupportedImageReference,
}

impl ImageError {
    /// HTTP status code this error surfaces as
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UpstreamFetch { .. } | Self::FetchTransport { .. } => 502,
            Self::MalformedDataUri
            | Self::NotAnImage { .. }
            | Self::UnsupportedImageReference => 400,
        }
    }

    /// Machine-readable error type
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MalformedDataUri => "malformed_data_uri",
            Self::UpstreamFetch { .. } => "upstream_fetch_error",
            Self::FetchTransport { .. } => "image_fetch_error",
            Self::NotAnImage { .. } => "not_an_image",
            Self::UnsupportedImageReference => "unsupported_image_reference",
        }
    }
}
