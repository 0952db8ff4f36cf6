//! Route definitions for the gateway API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, state::AppState};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/healthz", get(handlers::health_check))
        // Chat completions
        .route("/chat/completions", post(handlers::chat_completion))
        .nest("/v1", v1_routes())
        // Provider endpoints
        .route("/providers", get(handlers::list_providers))
        .route("/providers/test", post(handlers::test_provider))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Versioned aliases
fn v1_routes() -> Router<AppState> {
    Router::new().route("/chat/completions", post(handlers::chat_completion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ChatService;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use gateway_config::GatewayConfig;
    use gateway_providers::ProviderRegistry;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let service = ChatService::new(
            Arc::new(ProviderRegistry::new()),
            Arc::new(GatewayConfig::default()),
        );
        AppState::new(service)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["services"]["chat"], "no_api_keys");
    }

    #[tokio::test]
    async fn test_providers_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/providers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["providers"],
            serde_json::json!(["groq", "openrouter", "gemini", "atlas", "chutes"])
        );
        assert_eq!(body["default"], "groq");
    }

    #[tokio::test]
    async fn test_empty_prompt_is_bad_request() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/chat/completions")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"prompt":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "invalid_request");
        assert_eq!(body["error"]["stage"], "validate");
    }

    #[tokio::test]
    async fn test_provider_check_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/providers/test")
                    .body(Body::from(r#"{"provider":"atlas"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, serde_json::json!({"provider": "atlas", "status": "no_api_key"}));
    }
}
