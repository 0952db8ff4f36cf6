//! # Gateway Server
//!
//! HTTP server for the chat completion gateway.
//!
//! This crate provides:
//! - The chat completion orchestrator ([`ChatService`])
//! - Axum routes for chat, health, and provider endpoints
//! - The JSON error envelope
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod service;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use routes::create_router;
pub use server::{Server, ServerConfig};
pub use service::{
    ChatService, HealthReport, ProviderStatus, ProviderTestRequest, ProviderTestResult,
    ProvidersResponse, ServiceError, Stage,
};
pub use shutdown::shutdown_signal;
pub use state::AppState;
