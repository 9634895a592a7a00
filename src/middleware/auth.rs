//! Authentication extractors
//!
//! Verify the bearer token, reload the account and enforce role rules.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{verify_token, AuthError, AuthService, JwtError};
use crate::error::ApiError;
use crate::user::User;

/// Account behind a valid bearer token, as currently stored
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Error body for authentication and authorisation failures
#[derive(Debug, Serialize)]
struct AuthRejection {
    #[serde(skip)]
    status: StatusCode,
    error: AuthRejectionDetails,
}

#[derive(Debug, Serialize)]
struct AuthRejectionDetails {
    code: &'static str,
    message: &'static str,
}

impl AuthRejection {
    fn unauthorized(code: &'static str, message: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: AuthRejectionDetails { code, message },
        }
    }

    fn forbidden(message: &'static str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            error: AuthRejectionDetails {
                code: "FORBIDDEN",
                message,
            },
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthRejection::unauthorized(
                        "MISSING_TOKEN",
                        "Authorization header with Bearer token required",
                    )
                    .into_response()
                })?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = verify_token(bearer.token(), auth_service.jwt_secret()).map_err(|e| {
            let rejection = match e {
                JwtError::TokenExpired => {
                    AuthRejection::unauthorized("TOKEN_EXPIRED", "Token has expired")
                }
                _ => AuthRejection::unauthorized("INVALID_TOKEN", "Invalid token"),
            };
            rejection.into_response()
        })?;

        let user_id = claims.user_id().map_err(|_| {
            AuthRejection::unauthorized("INVALID_TOKEN", "Invalid user ID in token")
                .into_response()
        })?;

        // Role and approval come from the stored account, not the token
        let user = match auth_service.get_user_by_id(user_id).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => {
                return Err(AuthRejection::unauthorized(
                    "INVALID_TOKEN",
                    "Account no longer exists",
                )
                .into_response())
            }
            Err(e) => return Err(ApiError::from(e).into_response()),
        };

        if !user.is_approved {
            tracing::debug!(user_id = %user.id, "Rejected unapproved account");
            return Err(
                AuthRejection::forbidden("Agent login is not approved by admin").into_response(),
            );
        }

        Ok(AuthenticatedUser { user })
    }
}

/// Requires an admin
pub struct AdminUser(pub User);

/// Requires an approved agent
pub struct AgentUser(pub User);

/// Requires an admin or an approved agent
pub struct StaffUser(pub User);

/// Requires a customer
pub struct CustomerUser(pub User);

async fn require_role<S>(
    parts: &mut Parts,
    state: &S,
    allowed: fn(&User) -> bool,
    message: &'static str,
) -> Result<User, Response>
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    let AuthenticatedUser { user } = AuthenticatedUser::from_request_parts(parts, state).await?;

    if !allowed(&user) {
        tracing::debug!(user_id = %user.id, role = %user.role, "Role check failed");
        return Err(AuthRejection::forbidden(message).into_response());
    }

    Ok(user)
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, User::is_admin, "Admin access required")
            .await
            .map(AdminUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AgentUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, User::is_active_agent, "Agent access required")
            .await
            .map(AgentUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, User::is_staff, "Staff access required")
            .await
            .map(StaffUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CustomerUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, User::is_customer, "Customer access required")
            .await
            .map(CustomerUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_statuses() {
        let response = AuthRejection::unauthorized("MISSING_TOKEN", "missing").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthRejection::forbidden("nope").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_rejection_body_shape() {
        let json =
            serde_json::to_value(AuthRejection::unauthorized("TOKEN_EXPIRED", "expired")).unwrap();
        assert_eq!(json["error"]["code"], "TOKEN_EXPIRED");
        assert_eq!(json["error"]["message"], "expired");
        assert!(json.get("status").is_none());
    }
}
