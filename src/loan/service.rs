//! Loan service layer - persistence for the loan lifecycle

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::error::{LoanError, LoanResult};
use super::lifecycle::{Clock, SystemClock};
use super::model::{
    Decision, EditLoanRequest, Loan, LoanChange, LoanHistoryEntry, LoanRequest, LoanStatus,
};

/// Loan service for managing loan lifecycle
#[derive(Clone)]
pub struct LoanService {
    db_pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl LoanService {
    /// Create a new loan service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self::with_clock(db_pool, Arc::new(SystemClock))
    }

    pub fn with_clock(db_pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { db_pool, clock }
    }

    /// Open a loan for a borrower on behalf of the granting agent
    pub async fn request_loan(
        &self,
        borrower_id: Uuid,
        granted_by: Uuid,
        request: LoanRequest,
    ) -> LoanResult<Loan> {
        let loan = Loan::create(request, borrower_id, granted_by, self.clock.as_ref())?;

        let mut tx = self.db_pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                id, borrower_id, granted_by, principal, months, interest,
                emi, amount, status, start_date, end_date, modified_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(loan.borrower_id)
        .bind(loan.granted_by)
        .bind(loan.terms.principal)
        .bind(loan.terms.term_months)
        .bind(loan.terms.annual_rate_percent)
        .bind(loan.terms.monthly_installment)
        .bind(loan.terms.total_amount)
        .bind(loan.status)
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.modified_date)
        .fetch_one(&mut *tx)
        .await?;

        record_history(
            &mut tx,
            &loan,
            LoanChange::Created,
            Some(granted_by),
            loan.modified_date,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            loan_id = %loan.id,
            borrower_id = %borrower_id,
            granted_by = %granted_by,
            principal = loan.terms.principal,
            months = loan.terms.term_months,
            "Loan requested"
        );

        Ok(loan)
    }

    /// Approve or reject a loan
    pub async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        decided_by: Uuid,
    ) -> LoanResult<Loan> {
        let mut tx = self.db_pool.begin().await?;

        let mut locked = lock_loan(&mut tx, id).await?;
        let previous = locked.status;
        let touched = locked.decide(decision, self.clock.as_ref());

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1, modified_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(locked.status)
        .bind(touched.at)
        .bind(locked.id)
        .fetch_one(&mut *tx)
        .await?;

        record_history(&mut tx, &loan, LoanChange::Decided, Some(decided_by), touched.at).await?;

        tx.commit().await?;

        if previous != LoanStatus::New {
            tracing::warn!(
                loan_id = %id,
                previous = %previous,
                status = %loan.status,
                "Loan decision overwrote an earlier decision"
            );
        } else {
            tracing::info!(loan_id = %id, status = %loan.status, "Loan decided");
        }

        Ok(loan)
    }

    /// Change a loan's principal and/or term, resubmitting it as NEW
    pub async fn edit(
        &self,
        id: Uuid,
        request: &EditLoanRequest,
        edited_by: Uuid,
    ) -> LoanResult<Loan> {
        let mut tx = self.db_pool.begin().await?;

        let mut locked = lock_loan(&mut tx, id).await?;
        let merged = request.merge_onto(&locked.terms);

        let touched = match locked.edit(merged, self.clock.as_ref()) {
            Ok(touched) => touched,
            Err(e) => {
                tracing::debug!(loan_id = %id, error = %e, "Loan edit refused");
                return Err(e);
            }
        };

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET principal = $1, months = $2, interest = $3, emi = $4, amount = $5,
                status = $6, start_date = $7, end_date = $8, modified_date = $9
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(locked.terms.principal)
        .bind(locked.terms.term_months)
        .bind(locked.terms.annual_rate_percent)
        .bind(locked.terms.monthly_installment)
        .bind(locked.terms.total_amount)
        .bind(locked.status)
        .bind(locked.start_date)
        .bind(locked.end_date)
        .bind(touched.at)
        .bind(locked.id)
        .fetch_one(&mut *tx)
        .await?;

        record_history(&mut tx, &loan, LoanChange::Edited, Some(edited_by), touched.at).await?;

        tx.commit().await?;

        tracing::info!(
            loan_id = %id,
            principal = loan.terms.principal,
            months = loan.terms.term_months,
            "Loan edited and resubmitted"
        );

        Ok(loan)
    }

    /// Get loan by ID
    pub async fn get_loan(&self, id: Uuid) -> LoanResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| LoanError::NotFound(format!("Loan {} not found", id)))
    }

    /// List all loans, optionally filtered by status
    pub async fn list_loans(&self, status: Option<LoanStatus>) -> LoanResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE ($1::loan_status IS NULL OR status = $1)
            ORDER BY modified_date DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(loans)
    }

    /// List the loans held by one borrower
    pub async fn list_for_borrower(&self, borrower_id: Uuid) -> LoanResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE borrower_id = $1 ORDER BY modified_date DESC",
        )
        .bind(borrower_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(loans)
    }

    /// Change history of a loan, oldest first
    pub async fn history(&self, id: Uuid) -> LoanResult<Vec<LoanHistoryEntry>> {
        self.get_loan(id).await?;

        let entries = sqlx::query_as::<_, LoanHistoryEntry>(
            "SELECT * FROM loan_history WHERE loan_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(entries)
    }
}

async fn lock_loan(conn: &mut PgConnection, id: Uuid) -> LoanResult<Loan> {
    sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| LoanError::NotFound(format!("Loan {} not found", id)))
}

async fn record_history(
    conn: &mut PgConnection,
    loan: &Loan,
    change: LoanChange,
    changed_by: Option<Uuid>,
    at: DateTime<Utc>,
) -> LoanResult<()> {
    sqlx::query(
        r#"
        INSERT INTO loan_history (
            loan_id, change_type, changed_by, status,
            principal, months, interest, emi, amount, recorded_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(loan.id)
    .bind(change)
    .bind(changed_by)
    .bind(loan.status)
    .bind(loan.terms.principal)
    .bind(loan.terms.term_months)
    .bind(loan.terms.annual_rate_percent)
    .bind(loan.terms.monthly_installment)
    .bind(loan.terms.total_amount)
    .bind(at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
