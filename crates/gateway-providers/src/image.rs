//! Image reference resolution.
//!
//! Adapters whose upstream needs inline bytes call [`ImageResolver::resolve`]
//! to turn a data URI, a remote URL, or a bare base64 payload into a
//! `(base64, mime)` pair. Nothing is cached between calls.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gateway_core::{ImageError, ImageReference, DEFAULT_IMAGE_MIME_TYPE};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Base64 image payload with its mime type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Base64-encoded bytes
    pub data: String,
    /// Mime type, e.g. `image/png`
    pub mime_type: String,
}

impl ResolvedImage {
    /// Render as a `data:` URI
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the payload
    pub fn decode(&self) -> Result<Vec<u8>, ImageError> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|_| ImageError::MalformedDataUri)
    }
}

/// Parse `data:<mime>;base64,<data>`, the `;base64` marker being optional
pub fn parse_data_uri(uri: &str) -> Result<ResolvedImage, ImageError> {
    let rest = uri.strip_prefix("data:").ok_or(ImageError::MalformedDataUri)?;
    let (meta, data) = rest.split_once(',').ok_or(ImageError::MalformedDataUri)?;
    let mime_type = meta.strip_suffix(";base64").unwrap_or(meta);

    let mime_type = if mime_type.is_empty() {
        DEFAULT_IMAGE_MIME_TYPE
    } else {
        mime_type
    };

    Ok(ResolvedImage {
        data: data.to_string(),
        mime_type: mime_type.to_string(),
    })
}

/// Resolves image references into inline base64
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: Client,
}

impl ImageResolver {
    /// Share an existing client; its timeout bounds every fetch
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a resolver with its own client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn with_timeout(timeout: Duration) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::FetchTransport {
                message: e.to_string(),
            })?;
        Ok(Self::new(client))
    }

    /// Resolve a reference into inline base64
    pub async fn resolve(&self, reference: &ImageReference) -> Result<ResolvedImage, ImageError> {
        match reference {
            ImageReference::Inline { data, mime_type } => Ok(ResolvedImage {
                data: data.clone(),
                mime_type: mime_type.clone(),
            }),
            ImageReference::Url { url } => self.resolve_url(url).await,
        }
    }

    /// Resolve a raw reference string (data URI or http(s) URL)
    pub async fn resolve_url(&self, url: &str) -> Result<ResolvedImage, ImageError> {
        if url.starts_with("data:") {
            parse_data_uri(url)
        } else if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch(url).await
        } else {
            Err(ImageError::UnsupportedImageReference)
        }
    }

    async fn fetch(&self, url: &str) -> Result<ResolvedImage, ImageError> {
        debug!(url = %url, "Fetching image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::FetchTransport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::UpstreamFetch {
                status: status.as_u16(),
            });
        }

        let mime_type = match response.headers().get(CONTENT_TYPE) {
            None => DEFAULT_IMAGE_MIME_TYPE.to_string(),
            Some(value) => image_mime_type(value.to_str().unwrap_or_default())?,
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::FetchTransport {
                message: e.to_string(),
            })?;

        debug!(url = %url, mime_type = %mime_type, size = bytes.len(), "Fetched image");

        Ok(ResolvedImage {
            data: STANDARD.encode(&bytes),
            mime_type,
        })
    }
}

/// Essence of an `image/*` content type, parameters dropped
fn image_mime_type(content_type: &str) -> Result<String, ImageError> {
    let not_an_image = || ImageError::NotAnImage {
        content_type: content_type.to_string(),
    };

    let parsed: mime::Mime = content_type.parse().map_err(|_| not_an_image())?;
    if parsed.type_() != mime::IMAGE {
        return Err(not_an_image());
    }
    Ok(parsed.essence_str().to_string())
}
