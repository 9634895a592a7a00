//! Middleware for the Loanbook API
//!
//! Request tracing, security headers and role-checked authentication.

pub mod auth;
mod security;
mod tracing;

pub use auth::{AdminUser, AgentUser, AuthenticatedUser, CustomerUser, StaffUser};
pub use security::{hsts_header, security_headers};
pub use self::tracing::{request_tracing, REQUEST_ID_HEADER};
