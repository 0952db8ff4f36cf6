//! HTTP server runner.

use crate::{routes::create_router, shutdown::shutdown_signal, state::AppState};
use std::io;
use tokio::net::TcpListener;
use tracing::info;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8080;

/// Listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Create default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port` bind address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&gateway_config::ServerConfig> for ServerConfig {
    fn from(config: &gateway_config::ServerConfig) -> Self {
        Self::new().with_host(&config.host).with_port(config.port)
    }
}

/// Gateway HTTP server
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a server
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until a shutdown signal arrives
    ///
    /// # Errors
    /// Returns error if the listener cannot be bound or the server fails
    pub async fn run(self) -> io::Result<()> {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    ///
    /// # Errors
    /// Returns error if the server fails
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        info!(address = %listener.local_addr()?, "Gateway listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(async {
                shutdown_signal().await;
            })
            .await?;

        info!("Gateway stopped");
        Ok(())
    }
}
