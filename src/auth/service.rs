//! Authentication service
//!
//! Registration, login and token issuance for email/password accounts.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::user::{
    normalize_email, AuthTokenResponse, CreateAdminRequest, LoginRequest, SignupRequest, User,
    UserResponse, UserRole,
};

use super::jwt::{generate_token, JwtError};
use super::password::{hash_password, verify_password, PasswordError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("This account already exists")]
    AlreadyExists,

    #[error("Role '{0}' cannot be self-registered")]
    RoleNotAllowed(UserRole),

    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Agent login is not approved by admin")]
    NotApproved,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Password error: {0}")]
    PasswordError(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::AlreadyExists,
            _ => AuthError::DatabaseError(e.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::TokenError(e.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::PasswordError(e.to_string())
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
    jwt_secret: String,
    token_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        db_pool: PgPool,
        jwt_secret: String,
        token_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            db_pool,
            jwt_secret,
            token_ttl_seconds,
            bcrypt_cost,
        }
    }

    /// Register a customer or agent and issue a token.
    ///
    /// Agents start unapproved and cannot log in until an admin approves them,
    /// but still receive a token here.
    pub async fn register(&self, request: SignupRequest) -> Result<AuthTokenResponse, AuthError> {
        if request.role == UserRole::Admin {
            return Err(AuthError::RoleNotAllowed(UserRole::Admin));
        }

        let is_approved = request.role != UserRole::Agent;
        let user = self
            .insert_user(
                &request.email,
                &request.password,
                &request.first_name,
                &request.last_name,
                request.role,
                is_approved,
            )
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        self.issue_token(user)
    }

    /// Create another admin account
    pub async fn create_admin(
        &self,
        request: CreateAdminRequest,
    ) -> Result<UserResponse, AuthError> {
        let user = self
            .insert_user(
                &request.email,
                &request.password,
                &request.first_name,
                &request.last_name,
                UserRole::Admin,
                true,
            )
            .await?;

        tracing::info!(user_id = %user.id, "Admin created");

        Ok(user.into())
    }

    /// Make sure the configured startup admin exists.
    ///
    /// Returns `true` only when the account was created by this call. An email
    /// already held by a customer or agent is left alone.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.db_pool)
            .await?;

        if let Some(user) = existing {
            if user.is_admin() {
                tracing::debug!(user_id = %user.id, "Startup admin already present");
            } else {
                tracing::warn!(
                    user_id = %user.id,
                    role = %user.role,
                    "ADMIN_EMAIL belongs to a non-admin account, skipping admin bootstrap"
                );
            }
            return Ok(false);
        }

        let request = CreateAdminRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "Admin".to_string(),
            last_name: "Account".to_string(),
        };

        match self.create_admin(request).await {
            Ok(admin) => {
                tracing::info!(user_id = %admin.id, "Startup admin created");
                Ok(true)
            }
            // Another instance won the insert
            Err(AuthError::AlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check credentials, stamp the login time and issue a token
    pub async fn login(&self, request: LoginRequest) -> Result<AuthTokenResponse, AuthError> {
        let user: User = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(&request.email))
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_approved {
            return Err(AuthError::NotApproved);
        }

        let user: User =
            sqlx::query_as("UPDATE users SET last_login = $1 WHERE id = $2 RETURNING *")
                .bind(Utc::now())
                .bind(user.id)
                .fetch_one(&self.db_pool)
                .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        self.issue_token(user)
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User, AuthError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Get JWT secret (for middleware use)
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    async fn insert_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        role: UserRole,
        is_approved: bool,
    ) -> Result<User, AuthError> {
        let password_hash = hash_password(password, self.bcrypt_cost)?;
        let now = Utc::now();

        let user = sqlx::query_as(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name,
                role, is_approved, date_joined, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(normalize_email(email))
        .bind(password_hash)
        .bind(first_name.trim())
        .bind(last_name.trim())
        .bind(role)
        .bind(is_approved)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(user)
    }

    fn issue_token(&self, user: User) -> Result<AuthTokenResponse, AuthError> {
        let token = generate_token(&user, &self.jwt_secret, self.token_ttl_seconds)?;

        Ok(AuthTokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_ttl_seconds,
            user: user.into(),
        })
    }
}
