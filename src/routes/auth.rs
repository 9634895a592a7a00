//! Account registration and login routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/signup", post(auth::signup))
        .route("/api/user/login", post(auth::login))
        .route("/api/user/profile", get(auth::profile))
        .route("/api/admin/users", post(auth::create_admin))
}
