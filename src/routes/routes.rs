//! Defines routes for the Drive gateway.
//!
//! ## Structure
//! - `GET  /`: welcome text
//! - `POST /upload`: multipart upload (`file` + metadata fields)
//! - `GET  /list`: folder listing with decoded metadata
//! - `POST /update`: multipart replace (`fileId`, `file` + metadata fields)
//! - `POST /delete`: JSON `{ "fileId": ... }`
//! - `GET  /healthz`: liveness

use crate::{
    config::AppConfig,
    handlers::{
        health_handlers::healthz,
        item_handlers::{delete_item, list_items, update_item, upload_item, welcome},
    },
    services::gateway_service::GatewayService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the router for all gateway routes.
///
/// The router carries shared state (`GatewayService`) to all handlers.
pub fn routes() -> Router<GatewayService> {
    Router::new()
        .route("/", get(welcome))
        .route("/healthz", get(healthz))
        .route("/upload", post(upload_item))
        .route("/list", get(list_items))
        .route("/update", post(update_item))
        .route("/delete", post(delete_item))
}

/// Routes with state, body limit, CORS and request tracing applied.
pub fn app(service: GatewayService, cfg: &AppConfig) -> Router {
    routes()
        .with_state(service)
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(cors_layer(cfg.cors_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
}

/// Any origin by default; an explicit list also allows credentials.
fn cors_layer(origins: Option<&[HeaderValue]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match origins {
        Some(origins) => layer
            .allow_origin(AllowOrigin::list(origins.iter().cloned()))
            .allow_credentials(true),
        None => layer.allow_origin(Any),
    }
}
