//! Route definitions for the Loanbook API

mod auth;
mod loan;
mod user;

use axum::{routing::get, Router};

use crate::handlers::system;
use crate::state::AppState;

pub use auth::auth_routes;
pub use loan::loan_routes;
pub use user::user_routes;

/// Banner and health check
pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health_check))
}
