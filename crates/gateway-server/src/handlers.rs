//! HTTP request handlers for the gateway API.

use axum::{extract::State, Json};
use gateway_core::{ChatRequest, ChatResponse, GatewayError};
use gateway_telemetry::llm_request_span;
use tracing::{debug, warn, Instrument};

use crate::{
    error::ApiError,
    extractors::{JsonBody, RequestId},
    service::{HealthReport, ProviderTestRequest, ProviderTestResult, ProvidersResponse},
    state::AppState,
};

/// Chat completion endpoint
pub async fn chat_completion(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    JsonBody(request): JsonBody<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let provider = state.service.provider_for(&request).to_string();
    let span = llm_request_span!(request_id, provider);
    let deadline = state.request_timeout;

    async move {
        debug!(
            model = request.model.as_deref().unwrap_or_default(),
            with_image = request.has_image_attachment(),
            "Processing chat completion request"
        );

        match tokio::time::timeout(deadline, state.service.process_chat_completion(request)).await {
            Ok(Ok(response)) => Ok(Json(response)),
            Ok(Err(e)) => Err(ApiError::from(e)),
            Err(_) => {
                warn!(after = ?deadline, "Chat completion deadline elapsed");
                Err(ApiError::from(GatewayError::Timeout { after: deadline }))
            }
        }
    }
    .instrument(span)
    .await
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.service.health_status())
}

/// Supported providers endpoint
pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(state.service.supported_providers())
}

/// Local provider check endpoint
pub async fn test_provider(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProviderTestRequest>,
) -> Json<ProviderTestResult> {
    Json(state.service.test_provider(&body.provider))
}
