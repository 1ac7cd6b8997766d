use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use std::{sync::Arc, time::Instant};

use crate::routes::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub db: &'static str,
    pub latency_ms: f64,
}

/// Health check endpoint; reports `degraded` rather than failing when the database is down
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let started = Instant::now();
    let (status, db, latency_ms) = match state.store.ping().await {
        Ok(()) => {
            let elapsed = started.elapsed().as_secs_f64() * 1000.0;
            ("ok", "ok", (elapsed * 100.0).round() / 100.0)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            ("degraded", "down", 0.0)
        }
    };

    Json(HealthResponse {
        status,
        version: state.version.clone(),
        db,
        latency_ms,
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
