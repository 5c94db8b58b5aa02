//! Server runner.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::{error::ServerError, routes::create_router, shutdown::shutdown_signal, state::AppState};

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Resolve host and port into a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let candidate = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        };
        candidate
            .parse()
            .map_err(|_| ServerError::InvalidAddress(candidate))
    }
}

/// HTTP server over a shared [`AppState`]
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(async {
            shutdown_signal().await;
        })
        .await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        info!(address = %local_addr, "Medical chat relay listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}
