use axum::extract::State;
use axum::response::Json;
use cas_bench::RunResult;
use serde_json::json;
use tracing::info;

use crate::error::{ServerError, ServerResult};
use crate::router::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "cas-server",
        "version": env!("CARGO_PKG_VERSION"),
        "backends": state.suite.backend_names(),
        "iterations": state.suite.config().iterations,
    }))
}

/// Run every backend benchmark, record the report and return it.
///
/// The suite blocks for its whole duration, so it runs on the blocking pool.
pub async fn run_bench_handler(State(state): State<AppState>) -> ServerResult<Json<RunResult>> {
    let suite = state.suite.clone();
    let run = tokio::task::spawn_blocking(move || suite.run())
        .await
        .map_err(|e| ServerError::Bench(e.to_string()))?;

    state.history.record(run.clone());
    info!(runs = state.history.len(), "recorded benchmark run");
    Ok(Json(run))
}

/// Every recorded run, oldest first.
pub async fn history_handler(State(state): State<AppState>) -> Json<Vec<RunResult>> {
    Json(state.history.snapshot())
}

/// The most recent run, or 404 before the first one.
pub async fn latest_handler(State(state): State<AppState>) -> ServerResult<Json<RunResult>> {
    state
        .history
        .latest()
        .map(Json)
        .ok_or_else(|| ServerError::NotFound("no benchmark runs recorded".into()))
}
