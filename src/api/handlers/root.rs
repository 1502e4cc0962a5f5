use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::{json, Map, Value};

use crate::{domain::ResourceKind, error::AppError};

fn endpoints() -> Map<String, Value> {
    let mut endpoints = Map::new();
    for kind in ResourceKind::ALL {
        endpoints.insert(
            kind.segment().to_string(),
            Value::String(format!("/api/{}", kind.segment())),
        );
    }
    endpoints.insert("images".to_string(), Value::String("/api/images".to_string()));
    endpoints
}

pub async fn root() -> impl IntoResponse {
    let mut endpoints = endpoints();
    endpoints.insert("health".to_string(), Value::String("/health".to_string()));

    Json(json!({
        "message": "José María Linares school content API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "ok",
        "message": "API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "endpoints": endpoints(),
    })))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
