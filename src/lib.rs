pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::map_response,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::AppConfig;
use crate::database::LocationStore;

/// Shared, read-only state handed to every handler.
///
/// Built once at startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LocationStore>,
    pub environment: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn LocationStore>, environment: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            environment: environment.into(),
        }
    }
}

/// Build the HTTP application: routes, fallbacks and global middleware.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health).fallback(handlers::not_found))
        .route(
            "/api/locations",
            post(handlers::locations::create).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        // Innermost first: panics become INTERNAL_ERROR before any other layer sees them
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(map_response(middleware::json_payload_too_large))
        .layer(middleware::cors_layer(&config.security))
        .layer(map_response(middleware::security_headers))
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    } else {
        router
    }
}
