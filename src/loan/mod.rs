//! Loan domain module
//!
//! Rate tiers and EMI arithmetic, the loan status lifecycle, and the
//! Postgres-backed service that persists it.

pub mod calc;
mod error;
pub mod lifecycle;
mod model;
mod service;

pub use calc::{compute_emi, rate_for_principal, round_currency, Money, Percent};
pub use error::{LoanError, LoanResult};
pub use lifecycle::{Clock, FixedClock, SystemClock};
pub use model::*;
pub use service::LoanService;
