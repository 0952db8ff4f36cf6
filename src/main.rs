//! # Chat Completion Gateway
//!
//! Provider-agnostic chat completion service with an OpenAI-style response
//! shape.
//!
//! ## Features
//!
//! - Groq, OpenRouter, Gemini, Atlas Cloud and Chutes adapters
//! - Text and image prompts
//! - Uniform error envelope with the failing pipeline stage
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults and keys from the environment
//! GROQ_API_KEY=gsk-... chat-completion-gateway
//!
//! # Start with a configuration file
//! GATEWAY_CONFIG=/path/to/gateway.yaml chat-completion-gateway
//!
//! # Start with environment overrides
//! GATEWAY_PORT=9000 chat-completion-gateway
//! ```

use anyhow::Context;
use gateway_config::GatewayConfig;
use gateway_providers::ProviderRegistry;
use gateway_server::{AppState, ChatService, Server, ServerConfig};
use gateway_telemetry::{init_logging, LoggingConfig};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %format!("{e:#}"), "Application failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    let config = GatewayConfig::load().context("failed to load configuration")?;

    let logging = LoggingConfig::new()
        .with_level(&config.logging.level)
        .with_json(config.logging.json);
    init_logging(&logging).context("failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        default_provider = %config.providers.default_provider,
        "Starting Chat Completion Gateway"
    );

    let registry =
        ProviderRegistry::from_config(&config.providers).context("failed to initialize providers")?;

    let server_config = ServerConfig::from(&config.server);
    let request_timeout = config.server.request_timeout;
    let default_provider = config.providers.default_provider.clone();

    let config = Arc::new(config);
    if !gateway_core::CredentialStore::has_any_api_key(config.as_ref()) {
        warn!("No provider API keys configured; chat completions will fail until one is set");
    }

    let service = ChatService::new(Arc::new(registry), config).with_default_provider(default_provider);
    let state = AppState::new(service).with_request_timeout(request_timeout);

    Server::new(server_config, state)
        .run()
        .await
        .context("server failed")?;

    Ok(())
}
