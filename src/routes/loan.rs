//! Loan route definitions

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::loan;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loans", get(loan::list_loans).post(loan::create_loan))
        .route("/api/loans/quote", get(loan::quote_loan))
        .route("/api/loans/mine", get(loan::my_loans))
        .route("/api/loans/:id", get(loan::get_loan).put(loan::edit_loan))
        .route("/api/loans/:id/decision", put(loan::decide_loan))
        .route("/api/loans/:id/history", get(loan::loan_history))
}
