//! Shared HTTP plumbing for the adapters.

use gateway_core::GatewayError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{error, trace};

/// Build the client an adapter uses for all of its calls
pub(crate) fn build_client(timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {e}")))
}

/// Send a prepared request and decode a successful JSON body.
///
/// Transport failures carry no status. Non-2xx replies carry the status and
/// the raw body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, GatewayError> {
    let response = request.send().await.map_err(|e| {
        error!(provider = provider, error = %e, "Upstream request failed");
        GatewayError::provider(provider, None, format!("Request failed: {e}"))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        GatewayError::provider(
            provider,
            Some(status.as_u16()),
            format!("Failed to read response: {e}"),
        )
    })?;

    trace!(provider = provider, status = %status, body = %body, "Received upstream response");

    if !status.is_success() {
        error!(provider = provider, status = status.as_u16(), "Upstream returned an error");
        return Err(GatewayError::provider(provider, Some(status.as_u16()), body));
    }

    serde_json::from_str(&body)
        .map_err(|e| GatewayError::response_parse(provider, format!("Invalid response JSON: {e}")))
}
