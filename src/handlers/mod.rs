//! API handlers for the Loanbook server

pub mod auth;
pub mod loan;
pub mod system;
pub mod user;

// Re-export extractors from middleware for handler use
pub use crate::middleware::auth::{
    AdminUser, AgentUser, AuthenticatedUser, CustomerUser, StaffUser,
};
