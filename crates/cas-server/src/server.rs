use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::{build_router, AppState};

/// Benchmark server. Owns the run history for its lifetime.
pub struct CasServer {
    config: ServerConfig,
    state: AppState,
}

impl CasServer {
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new(&config);
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            backends = ?self.state.suite.backend_names(),
            "cas server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| crate::error::ServerError::Internal(e.to_string()))
    }
}
