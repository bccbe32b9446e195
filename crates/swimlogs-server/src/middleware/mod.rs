//! HTTP middleware: CORS and request tracing

use axum::http::{header, Method};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::CorsConfig;

/// Create CORS layer from configuration
///
/// An empty origin list or a `*` entry allows any origin.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        // Browsers reject credentials combined with a wildcard origin
        return cors.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unparsable CORS origin");
                None
            },
        })
        .collect();
    cors = cors.allow_origin(origins);

    if config.allow_credentials {
        cors = cors.allow_credentials(true);
    }

    cors
}

/// Request span and response event for every HTTP call
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Micros),
        )
}
