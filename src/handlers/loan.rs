//! Loan HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{AdminUser, AgentUser, AuthenticatedUser, CustomerUser, StaffUser};
use crate::error::ApiError;
use crate::loan::{
    CreateLoanRequest, Decision, DecideLoanRequest, EditLoanRequest, ListLoansQuery, Loan,
    LoanError, LoanHistoryEntry, LoanQuote, LoanQuoteQuery, LoanRequest, LoanTerms,
};
use crate::models::ApiResponse;
use crate::state::AppState;
use crate::user::{User, UserError};

/// GET /api/loans/quote - Preview a loan's terms without saving it
pub async fn quote_loan(
    Query(query): Query<LoanQuoteQuery>,
) -> Result<Json<ApiResponse<LoanQuote>>, ApiError> {
    let terms = LoanTerms::derive(&LoanRequest::new(query.principal, query.months))?;
    Ok(Json(ApiResponse::ok(terms.into())))
}

/// POST /api/loans - Agent opens a loan for a customer
pub async fn create_loan(
    State(state): State<AppState>,
    AgentUser(agent): AgentUser,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Loan>>), ApiError> {
    let (borrower_ref, request) = req.into_parts()?;
    request.validate()?;

    let borrower = resolve_borrower(&state, &borrower_ref).await?;

    let loan = state
        .loan_service
        .request_loan(borrower.id, agent.id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(loan, "Loan requested")),
    ))
}

/// PUT /api/loans/:id/decision - Admin approves or rejects a loan
pub async fn decide_loan(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<DecideLoanRequest>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let decision: Decision = req.status.parse()?;

    let loan = state.loan_service.decide(id, decision, admin.id).await?;
    let message = format!("Loan {}", loan.status);

    Ok(Json(ApiResponse::with_message(loan, message)))
}

/// PUT /api/loans/:id - Agent edits a loan's principal and/or term
pub async fn edit_loan(
    State(state): State<AppState>,
    AgentUser(agent): AgentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EditLoanRequest>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = state.loan_service.edit(id, &req, agent.id).await?;

    Ok(Json(ApiResponse::with_message(loan, "Loan updated")))
}

/// GET /api/loans - All loans, optionally by status
pub async fn list_loans(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<ApiResponse<Vec<Loan>>>, ApiError> {
    let loans = state.loan_service.list_loans(query.status).await?;
    Ok(Json(ApiResponse::ok(loans)))
}

/// GET /api/loans/mine - The calling customer's loans
pub async fn my_loans(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
) -> Result<Json<ApiResponse<Vec<Loan>>>, ApiError> {
    let loans = state.loan_service.list_for_borrower(customer.id).await?;
    Ok(Json(ApiResponse::ok(loans)))
}

/// GET /api/loans/:id - One loan, for staff or its borrower
pub async fn get_loan(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Loan>>, ApiError> {
    let loan = state.loan_service.get_loan(id).await?;

    // Other customers' loans look absent
    if !caller.user.is_staff() && loan.borrower_id != caller.id() {
        return Err(LoanError::NotFound(format!("Loan {} not found", id)).into());
    }

    Ok(Json(ApiResponse::ok(loan)))
}

/// GET /api/loans/:id/history - Every recorded change to a loan
pub async fn loan_history(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<LoanHistoryEntry>>>, ApiError> {
    let entries = state.loan_service.history(id).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// Borrower by email or id; must exist and be a customer
async fn resolve_borrower(state: &AppState, reference: &str) -> Result<User, ApiError> {
    let user = match state.user_service.resolve_by_email_or_id(reference).await {
        Ok(user) => user,
        Err(UserError::NotFound(_)) => {
            let msg = format!("User '{}' does not exist", reference);
            return Err(LoanError::Validation(msg).into());
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_customer() {
        let msg = format!("User '{}' is not a customer", reference);
        return Err(LoanError::Validation(msg).into());
    }

    Ok(user)
}
