//! Account administration routes

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::handlers::user;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(user::list_users))
        .route("/api/users/customers", get(user::list_customers))
        .route("/api/agents/pending", get(user::list_pending_agents))
        .route("/api/agents/:id/approval", put(user::set_agent_approval))
        .route("/api/agents/:id", delete(user::delete_agent))
}
