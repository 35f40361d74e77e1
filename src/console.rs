//! HTTP management console.
//!
//! A small axum server exposing the live counter query, the current
//! configuration and the raw per-worker TPS metrics. The handlers only read
//! the shared [`TpsBoard`] cells, so a query never blocks production.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::metrics::TpsBoard;

/// Key under which the aggregate appears in the `/metrics/tps` response.
const TOTAL_KEY: &str = "Total";

/// The counter values returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    /// Per-worker events-per-second readings. Populated only for detailed
    /// queries.
    pub workers: Vec<u64>,
    /// Aggregate events per second across all workers.
    pub total: u64,
    /// Path of the loaded configuration file.
    pub config: String,
}

impl Counter {
    /// Assemble a counter snapshot from the shared TPS cells.
    pub fn collect(board: &TpsBoard, config_path: &Path, details: bool) -> Self {
        Self {
            workers: if details { board.snapshot() } else { Vec::new() },
            total: board.total(),
            config: config_path.display().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ConsoleState {
    pub board: Arc<TpsBoard>,
    pub config_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct DetailsQuery {
    #[serde(default)]
    details: Option<String>,
}

impl DetailsQuery {
    fn wanted(&self) -> bool {
        self.details.as_deref() == Some("true")
    }
}

/// Build the console router.
pub fn router(state: ConsoleState) -> Router {
    Router::new()
        .route("/counter", get(fetch_counter))
        .route("/config", get(current_config))
        .route("/metrics/tps", get(tps_snapshot))
        .with_state(state)
}

/// Serve the console until the shared token is cancelled.
pub async fn serve(
    state: ConsoleState,
    port: u16,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "management console listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn fetch_counter(
    State(state): State<ConsoleState>,
    Query(query): Query<DetailsQuery>,
) -> Json<Counter> {
    Json(Counter::collect(
        &state.board,
        &state.config_path,
        query.wanted(),
    ))
}

async fn current_config(
    State(state): State<ConsoleState>,
    Query(query): Query<DetailsQuery>,
) -> String {
    if query.wanted() {
        match tokio::fs::read_to_string(&state.config_path).await {
            Ok(contents) => contents,
            Err(e) => e.to_string(),
        }
    } else {
        state.config_path.display().to_string()
    }
}

async fn tps_snapshot(State(state): State<ConsoleState>) -> Json<HashMap<String, u64>> {
    let mut tps: HashMap<String, u64> = state
        .board
        .snapshot()
        .into_iter()
        .enumerate()
        .map(|(i, v)| (format!("worker{i}"), v))
        .collect();
    tps.insert(TOTAL_KEY.to_string(), state.board.total());
    Json(tps)
}
