//! Comply Platform Server
//!
//! Production server for the compliance administration backend.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COMPLY_API_PORT` | `8080` | HTTP API port |
//! | `COMPLY_DATABASE_URL` | `postgres://localhost:5432/comply` | Postgres connection URL |
//! | `COMPLY_DB_MAX_CONNECTIONS` | `10` | Connection pool size |
//! | `LOG_FORMAT` | `text` | `json` for structured output |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use comply_platform::store::SqlStore;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Clone)]
struct ServerState {
    pool: sqlx::PgPool,
    start_time: Instant,
}

#[tokio::main]
async fn main() -> Result<()> {
    comply_common::logging::init_logging("comply-server");

    info!("Starting Comply Platform Server");

    let api_port: u16 = env_or_parse("COMPLY_API_PORT", 8080);
    let database_url = env_or("COMPLY_DATABASE_URL", "postgres://localhost:5432/comply");
    let max_connections: u32 = env_or_parse("COMPLY_DB_MAX_CONNECTIONS", 10);

    info!("Connecting to Postgres");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await?;

    let store = Arc::new(SqlStore::new(pool.clone()));
    store.ensure_schema().await?;

    let state = ServerState {
        pool,
        start_time: Instant::now(),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);
    let listener = TcpListener::bind(&api_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Comply Platform Server shutdown complete");
    Ok(())
}

async fn health_handler(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.start_time.elapsed().as_secs(),
    }))
}

async fn ready_handler(State(state): State<ServerState>) -> Json<serde_json::Value> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    Json(serde_json::json!({
        "status": if db_ok { "READY" } else { "DEGRADED" },
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
