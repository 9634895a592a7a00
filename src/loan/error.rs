//! Loan domain errors

use thiserror::Error;

/// Errors from loan pricing, status changes and storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for LoanError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => LoanError::NotFound("Loan not found".to_string()),
            _ => LoanError::Database(e.to_string()),
        }
    }
}

/// Result alias for loan operations
pub type LoanResult<T> = Result<T, LoanError>;
