//! compliance-server - HTTP server for the compliance training engine
//!
//! Mounts the training routes over a shared [`TrainingEngine`] and serves
//! them with axum.

mod error;
pub mod http;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use compliance_training::TrainingEngine;
use tokio::net::TcpListener;

pub use error::ServerError;
pub use http::{ErrorResponse, create_router};
pub use state::AppState;

/// The compliance HTTP server
pub struct TrainingServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl TrainingServer {
    /// Create a new server around a configured engine
    pub fn new(config: ServerConfig, engine: TrainingEngine) -> Self {
        Self::with_state(config, Arc::new(AppState::new(engine)))
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("compliance server listening on {}", addr);
        self.serve(listener).await
    }

    /// Serve on an already-bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let router = create_router(self.state);
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:8080")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_training::TursoTrainingStore;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn engine(dir: &TempDir) -> TrainingEngine {
        let store = TursoTrainingStore::new_local(&dir.path().join("training.db"))
            .await
            .unwrap();
        TrainingEngine::new(Arc::new(store))
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_server_config_addr() {
        let config = ServerConfig::new("0.0.0.0", 9090);
        assert_eq!(config.addr(), "0.0.0.0:9090");
    }

    #[tokio::test]
    async fn test_training_server_new() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig::new("127.0.0.1", 9000);
        let server = TrainingServer::new(config, engine(&dir).await);
        assert_eq!(server.config().port, 9000);
        assert!(server.state().uptime_seconds() >= 0);
    }

    #[tokio::test]
    async fn test_serve_answers_health_over_tcp() {
        let dir = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = TrainingServer::new(ServerConfig::default(), engine(&dir).await);
        let handle = tokio::spawn(server.serve(listener));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /api/health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        handle.abort();
    }
}
