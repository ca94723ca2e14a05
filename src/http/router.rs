//! Application router.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::UuidRequestId;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// Build the application mounted under `config.base_url`.
#[allow(deprecated)]
pub fn build_router(config: &ServerConfig) -> Router {
    let routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health));

    let app = if config.base_url.is_empty() {
        routes
    } else {
        Router::new().nest(&config.base_url, routes)
    };

    app.layer(TimeoutLayer::new(config.request_timeout()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(TraceLayer::new_for_http())
}

async fn index() -> &'static str {
    concat!("lifeline ", env!("CARGO_PKG_VERSION"), "\n")
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
