//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::core::{Config, Result, ServerError, ServerState};
use crate::services::build_router;

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl-C, then drain in-flight requests for at most
    /// `shutdown_timeout_ms`
    pub async fn run(&self) -> Result<()> {
        let app = build_router(self.state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!("🚀 Order server listening on {}", addr);

        let drain = Arc::new(Notify::new());
        let drain_signal = drain.clone();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move { drain_signal.notified().await })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result.map_err(ServerError::Serve)?,
            _ = shutdown_signal() => {
                tracing::info!("Shutting down...");
                drain.notify_one();

                let timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
                match tokio::time::timeout(timeout, &mut serve).await {
                    Ok(result) => result.map_err(ServerError::Serve)?,
                    Err(_) => tracing::warn!(
                        timeout_ms = self.config.shutdown_timeout_ms,
                        "Graceful shutdown timed out, dropping open connections"
                    ),
                }
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
