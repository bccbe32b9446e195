//! Helpers for driving the router in integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use swimlogs_server::{api, config::Config};
use tower::ServiceExt;

/// Router wired exactly as in production, on top of `pool`
pub fn test_app(pool: PgPool) -> Router {
    api::create_router(pool, &Config::default())
}

/// Router whose pool never connects, for requests rejected before any query
pub fn offline_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/swimlogs_offline")
        .expect("lazy pool");
    test_app(pool)
}

/// Send one request and decode the JSON body, `Value::Null` when empty
pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        },
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Four sets, 1300m in total
pub fn training_payload() -> Value {
    serde_json::json!({
        "start": "2024-03-01T18:30:00Z",
        "durationMin": 45,
        "sets": [
            { "setOrder": 0, "repeat": 1, "distanceMeters": 400, "startType": "None" },
            {
                "setOrder": 1,
                "repeat": 4,
                "startType": "Interval",
                "startSeconds": 120,
                "subSets": [
                    { "subSetOrder": 0, "repeat": 1, "distanceMeters": 100 },
                    { "subSetOrder": 1, "repeat": 1, "distanceMeters": 50, "equipment": ["Fins"] }
                ]
            },
            { "setOrder": 2, "repeat": 1, "distanceMeters": 300, "startType": "Pause", "startSeconds": 30 }
        ]
    })
}
