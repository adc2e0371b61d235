//! Ledgerbook server - bookkeeping API.
//!
//! Serves the JSON API behind the deployment's authenticating proxy; the
//! proxy terminates the session and forwards the account id in `x-user-id`.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `PostgreSQL` for user data, migrated at startup
//! - Snowflake-style identifier generation (per-replica node id)
//! - In-process duplicate-submission tracking for idempotent creates

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, http::StatusCode, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerbook_server::config::ServerConfig;
use ledgerbook_server::state::AppState;
use ledgerbook_server::{db, routes};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ledgerbook_server=info,tower_http=debug".into());

    // JSON logs for log collectors, text locally
    let wants_json = std::env::var("LEDGERBOOK_LOG_JSON").is_ok();
    let json_layer = wants_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!wants_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    // Initialize database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // Apply embedded migrations before accepting traffic
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied");

    // Build application state
    let state = AppState::new(config.clone(), pool);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness check endpoint.
///
/// Kept separate from liveness so orchestrators can distinguish "process is
/// up" from "process is ready for traffic".
async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
