//! Operator HTTP endpoint.
//!
//! Runs on a separate tokio task next to the gateway. `/metrics` serves the
//! Prometheus registry, `/health` answers liveness checks and `/status`
//! reports what the bridge is currently doing as JSON.

use crate::security::ContextPolicy;
use crate::signalling::RecordingAitSink;
use axum::extract::State;
use axum::{Json, Router, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Live bridge state behind `/status`.
#[derive(Debug)]
pub struct StatusSource {
    pub name: String,
    pub methods: usize,
    pub policy: Arc<ContextPolicy>,
    pub ait: Arc<RecordingAitSink>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatus {
    pub name: String,
    pub started_at: String,
    pub running_app: Option<u32>,
    pub methods: usize,
    pub ait_sections: usize,
    pub latest_ait: Option<AitSummary>,
}

/// The most recently signalled AIT section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AitSummary {
    pub pid: u16,
    pub service_id: u16,
    pub len: usize,
}

impl StatusSource {
    pub fn snapshot(&self) -> BridgeStatus {
        BridgeStatus {
            name: self.name.clone(),
            started_at: self.started_at.to_rfc3339(),
            running_app: self.policy.running(),
            methods: self.methods,
            ait_sections: self.ait.count(),
            latest_ait: self.ait.latest().map(|s| AitSummary {
                pid: s.pid,
                service_id: s.service_id,
                len: s.bytes.len(),
            }),
        }
    }
}

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn status_handler(State(source): State<Arc<StatusSource>>) -> Json<BridgeStatus> {
    Json(source.snapshot())
}

pub fn router(source: Arc<StatusSource>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .with_state(source)
}

/// Serve the operator endpoint on `127.0.0.1:port` until the process exits.
pub async fn run_http_server(port: u16, source: Arc<StatusSource>) {
    let app = router(source);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind operator HTTP server");
            return;
        }
    };
    tracing::info!(%addr, "Operator HTTP server listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Operator HTTP server error");
    }
}
