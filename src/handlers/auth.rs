//! Account registration and login handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use super::{AdminUser, AuthenticatedUser};
use crate::error::ApiError;
use crate::models::ApiResponse;
use crate::state::AppState;
use crate::user::{
    AuthTokenResponse, CreateAdminRequest, LoginRequest, SignupRequest, UserResponse,
};

/// POST /api/user/signup - Register a customer or agent
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthTokenResponse>>), ApiError> {
    req.validate()?;

    let token = state.auth_service.register(req).await?;
    let message = if token.user.is_approved {
        "Account created"
    } else {
        "Account created, awaiting admin approval"
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(token, message)),
    ))
}

/// POST /api/user/login - Exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthTokenResponse>>, ApiError> {
    req.validate()?;

    let token = state.auth_service.login(req).await?;

    Ok(Json(ApiResponse::ok(token)))
}

/// GET /api/user/profile - Current account
pub async fn profile(user: AuthenticatedUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(user.user.into()))
}

/// POST /api/admin/users - Create another admin
pub async fn create_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    req.validate()?;

    let created = state.auth_service.create_admin(req).await?;
    tracing::info!(admin_id = %admin.id, created_id = %created.id, "Admin account created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Admin created")),
    ))
}
