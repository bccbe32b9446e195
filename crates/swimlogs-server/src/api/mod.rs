//! HTTP surface: router assembly, service endpoints and the server loop

pub mod response;

use crate::config::Config;
use crate::db;
use crate::features::{self, FeatureState};
use crate::middleware;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use response::ErrorResponse;
use serde_json::json;
use sqlx::PgPool;
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tower_http::compression::CompressionLayer;

/// Build the application router with all routes and middleware
pub fn create_router(pool: PgPool, config: &Config) -> Router {
    let feature_state = FeatureState {
        db: pool.clone(),
        pages: config.pagination,
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(pool)
        .nest("/api/v1", features::router(feature_state))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Bind and serve until a shutdown signal arrives
pub async fn serve(config: Config, pool: PgPool) -> anyhow::Result<()> {
    let app = create_router(pool, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "SwimLogs Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(pool): State<PgPool>) -> Response {
    match db::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            let error = ErrorResponse::new("SERVICE_UNAVAILABLE", "Database is not reachable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
        },
    }
}

/// Resolve on Ctrl+C or SIGTERM
///
/// In-flight requests get `timeout_secs` to finish after the signal.
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!(timeout_secs, "Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
