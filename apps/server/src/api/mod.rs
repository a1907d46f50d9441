//! API layer - routes, handlers, and middleware

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();
    let admin_router = routes::admin::admin_routes(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .route("/favicon.ico", get(favicon))
        .merge(routes::metrics::metrics_routes())
        .nest("/api", routes::hospitals::api_routes())
        .nest("/admin", admin_router)
        .fallback(not_found)
        .with_state(state)
        // Applied in reverse order: the body limit runs first.
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(DefaultBodyLimit::max(max_body_size))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "bedfinder-server",
        "storage": state.store.backend_name(),
    }))
}

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "server": "Bedfinder",
            "version": env!("CARGO_PKG_VERSION"),
            "storage": state.store.backend_name(),
            "default_bed_match": state.config.search.default_bed_match,
            "status": "running"
        })),
    )
}

async fn favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

async fn not_found() -> crate::Error {
    crate::Error::NotFound("No such endpoint".to_string())
}
