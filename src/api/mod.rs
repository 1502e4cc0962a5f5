pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::CorsConfig, domain::ResourceKind, media::MAX_FILE_SIZE};
use state::AppState;

/// Multipart framing and the small text fields ride on top of the file.
const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

pub fn create_app(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.settings.cors);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // API routes
        .nest("/api", api_routes(app_state.clone()))
        .fallback(handlers::root::not_found)

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    let mut router = Router::new().nest("/images", image_routes(state.clone()));

    for kind in ResourceKind::ALL {
        router = router.nest(&format!("/{}", kind.segment()), record_routes(state.clone(), kind));
        if let Some(legacy) = kind.legacy_segment() {
            router = router.nest(&format!("/{}", legacy), record_routes(state.clone(), kind));
        }
    }

    router
}

fn record_routes(state: AppState, kind: ResourceKind) -> Router<AppState> {
    Router::new()
        // Public routes (no auth required for reading)
        .route("/", get(handlers::records::list))
        // Protected routes - bearer token unless disabled for records
        .merge(
            Router::new()
                .route("/", post(handlers::records::create))
                .route("/:id", put(handlers::records::update))
                .route("/:id", delete(handlers::records::delete))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_record_token,
                )),
        )
        .layer(Extension(kind))
}

fn image_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .route("/", get(handlers::images::list))
        .route("/folders", get(handlers::images::folders))
        // Protected routes - always require the bearer token
        .merge(
            Router::new()
                .route("/", post(handlers::images::upload))
                .route("/*public_id", delete(handlers::images::delete))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_api_token,
                ))
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
