//! Account listing and agent administration handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{AdminUser, StaffUser};
use crate::error::ApiError;
use crate::models::ApiResponse;
use crate::state::AppState;
use crate::user::{ApproveAgentRequest, User, UserResponse};

fn responses(users: Vec<User>) -> Vec<UserResponse> {
    users.into_iter().map(UserResponse::from).collect()
}

/// GET /api/users/customers - Customers, for staff picking a borrower
pub async fn list_customers(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.user_service.list_customers().await?;
    Ok(Json(ApiResponse::ok(responses(users))))
}

/// GET /api/users - Customers and agents
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.user_service.list_customers_and_agents().await?;
    Ok(Json(ApiResponse::ok(responses(users))))
}

/// GET /api/agents/pending - Agents awaiting approval
pub async fn list_pending_agents(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.user_service.list_pending_agents().await?;
    Ok(Json(ApiResponse::ok(responses(users))))
}

/// PUT /api/agents/:id/approval - Approve or revoke an agent
pub async fn set_agent_approval(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveAgentRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let agent = state
        .user_service
        .set_agent_approval(id, req.is_approved)
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        agent_id = %id,
        approved = req.is_approved,
        "Agent approval changed"
    );

    let message = if agent.is_approved {
        "Agent approved"
    } else {
        "Agent approval revoked"
    };

    Ok(Json(ApiResponse::with_message(agent.into(), message)))
}

/// DELETE /api/agents/:id - Remove an agent
pub async fn delete_agent(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.user_service.delete_agent(id).await?;

    tracing::info!(admin_id = %admin.id, agent_id = %id, "Agent removed");

    Ok(Json(ApiResponse::message("Agent deleted")))
}
