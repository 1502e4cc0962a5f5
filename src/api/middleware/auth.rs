use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{
    api::state::AppState,
    error::{AppError, Result},
};

/// Rejects the request unless it carries `Authorization: Bearer <api_token>`.
pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    check_bearer(request.headers(), &state.settings.auth.api_token)?;

    Ok(next.run(request).await)
}

/// Same check for record writes, unless `auth.protect_records` is off.
pub async fn require_record_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if state.settings.auth.protect_records {
        check_bearer(request.headers(), &state.settings.auth.api_token)?;
    }

    Ok(next.run(request).await)
}

pub fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<()> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if expected.is_empty() || !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::debug!("Rejected request with invalid bearer token");
        return Err(AppError::Unauthorized);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_accepts_matching_token() {
        assert!(check_bearer(&headers("Bearer s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn test_rejects_missing_or_wrong_token() {
        assert!(matches!(check_bearer(&HeaderMap::new(), "s3cret"), Err(AppError::Unauthorized)));
        assert!(matches!(check_bearer(&headers("Bearer nope"), "s3cret"), Err(AppError::Unauthorized)));
        assert!(matches!(check_bearer(&headers("s3cret"), "s3cret"), Err(AppError::Unauthorized)));
        assert!(matches!(check_bearer(&headers("Basic s3cret"), "s3cret"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_empty_secret_never_matches() {
        assert!(matches!(check_bearer(&headers("Bearer "), ""), Err(AppError::Unauthorized)));
    }
}
