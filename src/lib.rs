//! Loanbook Server Library
//!
//! Loan rate tiers, EMI arithmetic and the loan approval lifecycle, served
//! over an axum API backed by PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod loan;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod user;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

/// Assemble every route with the middleware stack
pub fn build_router(app_state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        .merge(routes::system_routes())
        .merge(routes::auth_routes())
        .merge(routes::user_routes())
        .merge(routes::loan_routes())
        .with_state(app_state);

    if config.environment.is_production() {
        router = router.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(middleware::request_tracing))
            .layer(axum::middleware::from_fn(middleware::security_headers))
            .layer(configure_cors(config.cors_allowed_origins.as_deref())),
    )
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}
