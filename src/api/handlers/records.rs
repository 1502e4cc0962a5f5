use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    api::{extract::Path, state::AppState},
    domain::{CreateRecordRequest, Record, ResourceKind, UpdateRecordRequest},
    error::{AppError, Result},
    service::record_service::NO_DATA,
};

// The resource kind is attached by the router as an extension, so one set of
// handlers serves every content table.

pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
) -> Result<Json<Vec<Record>>> {
    let records = state.service_context.record_service.list(kind).await?;

    Ok(Json(records))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>)> {
    let request: CreateRecordRequest = decode_payload(&body)?;

    let created = state
        .service_context
        .record_service
        .create(kind, request)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<Record>> {
    let request: UpdateRecordRequest = decode_payload(&body)?;

    let updated = state
        .service_context
        .record_service
        .update(kind, id, request)
        .await?;

    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(kind): Extension<ResourceKind>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.service_context.record_service.delete(kind, id).await?;

    Ok(Json(json!({
        "message": format!("{} deleted", kind.label()),
    })))
}

/// An absent body, `null` or `{}` carries no data. Any other object goes on
/// to the field checks, even when none of its keys are known.
fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Validation(NO_DATA.to_string()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?;

    match &value {
        Value::Null => return Err(AppError::Validation(NO_DATA.to_string())),
        Value::Object(fields) if fields.is_empty() => {
            return Err(AppError::Validation(NO_DATA.to_string()))
        }
        Value::Object(_) => {}
        _ => {
            return Err(AppError::Validation(
                "Request body must be a JSON object".to_string(),
            ))
        }
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}
