//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::AuthService;
use crate::config::Config;
use crate::loan::LoanService;
use crate::user::UserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub loan_service: Arc<LoanService>,
    pub db_pool: PgPool,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        user_service: Arc<UserService>,
        loan_service: Arc<LoanService>,
        db_pool: PgPool,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            loan_service,
            db_pool,
        }
    }

    /// Wire every service onto one pool
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_seconds,
            config.bcrypt_cost,
        ));
        let user_service = Arc::new(UserService::new(db_pool.clone()));
        let loan_service = Arc::new(LoanService::new(db_pool.clone()));

        Self::new(auth_service, user_service, loan_service, db_pool)
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<UserService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.user_service.clone()
    }
}

impl FromRef<AppState> for Arc<LoanService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.loan_service.clone()
    }
}
