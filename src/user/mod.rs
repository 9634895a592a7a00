//! Account domain module
//!
//! Users, roles and the agent-approval workflow.

mod model;
mod service;

pub use model::*;
pub use service::{UserError, UserService};
