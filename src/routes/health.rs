use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use mongodb::bson::doc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    database: DatabaseHealth,
}

#[derive(Serialize)]
struct DatabaseHealth {
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

/// Lightweight liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Detailed health check including database connectivity.
///
/// Reports on the cached handle only and never triggers establishment:
/// probes stay cheap and cannot fail on missing configuration. A cache
/// that has not connected yet reports `connected: false`.
async fn api_health(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let database = match state.db.handle() {
        Some(db) => {
            let started = Instant::now();
            match db.run_command(doc! { "ping": 1 }).await {
                Ok(_) => DatabaseHealth {
                    connected: true,
                    latency_ms: Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
                },
                Err(err) => {
                    tracing::warn!("Database ping failed: {err}");
                    DatabaseHealth {
                        connected: false,
                        latency_ms: None,
                    }
                }
            }
        }
        None => DatabaseHealth {
            connected: false,
            latency_ms: None,
        },
    };

    Json(DetailedHealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

/// Routes mounted at the server root.
pub fn root_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Routes mounted under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(api_health))
}
