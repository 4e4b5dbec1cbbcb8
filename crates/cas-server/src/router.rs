use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use cas_bench::{BenchHistory, BenchSuite};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<BenchHistory>,
    pub suite: Arc<BenchSuite>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            history: Arc::new(BenchHistory::new()),
            suite: Arc::new(config.suite()),
        }
    }
}

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/bench/run", post(handler::run_bench_handler))
        .route("/bench/history", get(handler::history_handler))
        .route("/bench/history/latest", get(handler::latest_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
