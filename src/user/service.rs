//! User service - account lookups and agent approval

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::model::{normalize_email, User, UserRole};

/// User service errors
#[derive(Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("User not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for UserError {
    fn from(e: sqlx::Error) -> Self {
        UserError::DatabaseError(e.to_string())
    }
}

/// Account queries used by the API and by loan requests
#[derive(Clone)]
pub struct UserService {
    db_pool: PgPool,
}

impl UserService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, UserError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    /// Look a user up by UUID text, or else by email
    pub async fn resolve_by_email_or_id(&self, reference: &str) -> Result<User, UserError> {
        let reference = reference.trim();

        if let Ok(id) = Uuid::parse_str(reference) {
            return self.get_user(id).await;
        }

        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(reference))
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| UserError::NotFound(reference.to_string()))
    }

    pub async fn list_customers(&self) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'customer' ORDER BY date_joined",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(users)
    }

    pub async fn list_customers_and_agents(&self) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role IN ('customer', 'agent') ORDER BY date_joined",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(users)
    }

    /// Agents still waiting for an admin to approve them
    pub async fn list_pending_agents(&self) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'agent' AND is_approved = FALSE ORDER BY date_joined",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(users)
    }

    pub async fn set_agent_approval(&self, id: Uuid, approved: bool) -> Result<User, UserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_approved = $1, updated_at = $2
            WHERE id = $3 AND role = $4
            RETURNING *
            "#,
        )
        .bind(approved)
        .bind(Utc::now())
        .bind(id)
        .bind(UserRole::Agent)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| UserError::NotFound(format!("agent {}", id)))?;

        tracing::info!(agent_id = %id, approved, "Agent approval updated");

        Ok(user)
    }

    /// Remove an agent account. Loans they granted keep existing.
    pub async fn delete_agent(&self, id: Uuid) -> Result<(), UserError> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1 AND role = $2")
            .bind(id)
            .bind(UserRole::Agent)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(UserError::NotFound(format!("agent {}", id)));
        }

        tracing::info!(agent_id = %id, "Agent deleted");

        Ok(())
    }
}
