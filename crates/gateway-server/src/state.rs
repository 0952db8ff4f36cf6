//! Shared application state.

use crate::service::ChatService;
use std::sync::Arc;
use std::time::Duration;

/// Default outer deadline for a chat completion
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// State handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Chat completion orchestrator
    pub service: Arc<ChatService>,
    /// Outer deadline for a chat completion
    pub request_timeout: Duration,
}

impl AppState {
    /// Create state around a service with the default deadline
    #[must_use]
    pub fn new(service: ChatService) -> Self {
        Self {
            service: Arc::new(service),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the outer deadline
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
