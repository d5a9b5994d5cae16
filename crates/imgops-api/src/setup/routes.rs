//! Router assembly

use anyhow::Context;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use imgops_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::handle_timeout_error;
use crate::handlers::{health, images};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = Router::new()
        .route("/convert-png-to-jpeg", post(images::convert_png_to_jpeg))
        .route("/image-resize", post(images::resize_image))
        .route("/image-compress", post(images::compress_image))
        .layer(cors);

    // Dropping the request future on timeout also drops any open history
    // transaction, which rolls it back.
    let request_timeout = Duration::from_secs(config.request_timeout_seconds());

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest(API_PREFIX, api_routes)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes()))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit()))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let headers = [header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    };
    Ok(cors)
}
