//! Authentication module for Loanbook
//!
//! - Email/password registration and login
//! - bcrypt password hashing
//! - JWT token generation and validation

mod jwt;
mod password;
mod service;

pub use jwt::{generate_token, verify_token, Claims, JwtError};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{AuthError, AuthService};
