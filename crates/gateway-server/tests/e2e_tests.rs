//! End-to-end tests for the chat completion gateway.
//!
//! Requests go through the real router, orchestrator, registry, and adapters;
//! upstream providers are wiremock stubs.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use gateway_config::GatewayConfig;
use gateway_core::ProviderType;
use gateway_providers::ProviderRegistry;
use gateway_server::{create_router, AppState, ChatService};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Gateway config pointing one provider at a stub upstream
fn config_for(provider: ProviderType, base_url: &str, api_key: Option<&str>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    let settings = config.providers.settings_mut(provider);
    settings.base_url = Some(base_url.to_string());
    settings.api_key = api_key.map(|key| SecretString::new(key.to_string()));
    config
}

fn create_app(config: GatewayConfig, request_timeout: Duration) -> axum::Router {
    let registry = ProviderRegistry::from_config(&config.providers).expect("registry builds");
    let service = ChatService::new(Arc::new(registry), Arc::new(config));
    create_router(AppState::new(service).with_request_timeout(request_timeout))
}

fn chat(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat/completions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "openai/gpt-oss-120b",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
    })
}

#[cfg(test)]
mod chat_completion_tests {
    use super::*;

    #[tokio::test]
    async fn test_groq_round_trip() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header_eq("authorization", "Bearer gsk-e2e"))
            .and(body_partial_json(json!({
                "messages": [{"role": "user", "content": "hello"}],
                "temperature": 0.5,
                "max_tokens": 1000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("hi")))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = create_app(
            config_for(ProviderType::Groq, &upstream.uri(), Some("gsk-e2e")),
            Duration::from_secs(5),
        );

        let response = app.oneshot(chat(&json!({"prompt": "hello"}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["object"], "chat.completion");
        assert_eq!(body["choices"].as_array().unwrap().len(), 1);
        assert_eq!(body["choices"][0]["message"]["content"], "hi");
        assert_eq!(body["choices"][0]["finish_reason"], "stop");
        assert_eq!(body["usage"]["total_tokens"], 7);
    }

    #[tokio::test]
    async fn test_upstream_rate_limit_surfaces_as_bad_gateway() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = create_app(
            config_for(ProviderType::Groq, &upstream.uri(), Some("gsk-e2e")),
            Duration::from_secs(5),
        );

        let response = app
            .oneshot(chat(&json!({"prompt": "hello", "provider": "groq"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = read_json(response).await;
        assert_eq!(body["error"]["type"], "provider_error");
        assert_eq!(body["error"]["stage"], "complete");
        assert_eq!(body["error"]["upstream_status"], 429);
    }

    #[tokio::test]
    async fn test_missing_key_never_reaches_upstream() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("hi")))
            .expect(0)
            .mount(&upstream)
            .await;

        let app = create_app(
            config_for(ProviderType::Atlas, &upstream.uri(), None),
            Duration::from_secs(5),
        );

        let response = app
            .oneshot(chat(&json!({"prompt": "hello", "provider": "atlas"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["error"]["type"], "missing_api_key");
        assert_eq!(body["error"]["stage"], "resolve_api_key");
    }

    #[tokio::test]
    async fn test_outer_deadline_returns_gateway_timeout() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&upstream)
            .await;

        let app = create_app(
            config_for(ProviderType::Chutes, &upstream.uri(), Some("cpk-e2e")),
            Duration::from_millis(100),
        );

        let response = app
            .oneshot(chat(&json!({"prompt": "hello", "provider": "chutes"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let body = read_json(response).await;
        assert_eq!(body["error"]["type"], "timeout");
    }

    #[tokio::test]
    async fn test_gemini_key_in_query_and_fabricated_id() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("key", "AIza-e2e"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "bonjour"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 1, "totalTokenCount": 4}
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let app = create_app(
            config_for(ProviderType::Gemini, &upstream.uri(), Some("AIza-e2e")),
            Duration::from_secs(5),
        );

        let response = app
            .oneshot(chat(&json!({"prompt": "translate hello", "provider": "gemini"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert!(body["id"].as_str().unwrap().starts_with("gemini-"));
        assert_eq!(body["choices"][0]["message"]["content"], "bonjour");
        assert_eq!(body["choices"][0]["finish_reason"], "stop");
        assert_eq!(body["usage"]["total_tokens"], 4);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = create_app(GatewayConfig::default(), Duration::from_secs(5));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/chat/completions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"prompt\":"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_json(response).await;
        assert_eq!(body["error"]["type"], "invalid_request");
    }
}

#[cfg(test)]
mod provider_endpoint_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_configured_key() {
        let app = create_app(
            config_for(ProviderType::OpenRouter, "https://openrouter.test/api/v1", Some("sk-or")),
            Duration::from_secs(5),
        );

        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["chat"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_provider_checks() {
        let config = config_for(ProviderType::OpenRouter, "https://openrouter.test/api/v1", Some("sk-or"));
        let cases = [
            ("", "invalid_request"),
            ("mistral", "invalid_provider"),
            ("groq", "no_api_key"),
            ("openrouter", "healthy"),
        ];

        for (provider, expected) in cases {
            let app = create_app(config.clone(), Duration::from_secs(5));
            let request = Request::builder()
                .method(Method::POST)
                .uri("/providers/test")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"provider": provider}).to_string()))
                .unwrap();

            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = read_json(response).await;
            assert_eq!(body["status"], expected, "provider {provider:?}");
        }
    }
}
