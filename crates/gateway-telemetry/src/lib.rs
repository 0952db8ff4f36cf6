//! # Gateway Telemetry
//!
//! Observability for the chat completion gateway.
//!
//! This crate provides:
//! - Structured logging setup (plain text or JSON lines)
//! - Span helpers for chat requests and upstream calls

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

// Re-export main types
pub use logging::{init_logging, LoggingConfig, LoggingError};
