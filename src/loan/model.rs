//! Loan models for Loanbook
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use super::calc::{compute_emi, rate_for_principal, round_currency, Money, Percent, MIN_PRINCIPAL};
use super::error::{LoanError, LoanResult};

/// Loan status enum
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    New,
    Approved,
    Rejected,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::New => "NEW",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome an admin may record against a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for LoanStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => LoanStatus::Approved,
            Decision::Rejected => LoanStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "APPROVED" => Ok(Decision::Approved),
            "REJECTED" => Ok(Decision::Rejected),
            other => Err(LoanError::Validation(format!(
                "status must be APPROVED or REJECTED, got '{}'",
                other
            ))),
        }
    }
}

/// Principal and term a loan is requested (or re-requested) with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    #[serde(rename = "months")]
    pub term_months: i32,
}

impl LoanRequest {
    pub fn new(principal: Money, term_months: i32) -> Self {
        Self {
            principal,
            term_months,
        }
    }

    /// Check the principal floor and the term before anything is computed
    pub fn validate(&self) -> LoanResult<()> {
        if !self.principal.is_finite() {
            return Err(LoanError::Validation(
                "Principal amount must be a finite number".to_string(),
            ));
        }
        if self.principal < MIN_PRINCIPAL {
            return Err(LoanError::Validation(format!(
                "Principal Amount Cannot be less than {}",
                MIN_PRINCIPAL
            )));
        }
        if self.term_months < 1 {
            return Err(LoanError::Validation(
                "Loan term must be at least one month".to_string(),
            ));
        }
        Ok(())
    }
}

/// Financial terms derived from a [`LoanRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoanTerms {
    pub principal: Money,
    #[serde(rename = "months")]
    #[sqlx(rename = "months")]
    pub term_months: i32,
    #[serde(rename = "interest")]
    #[sqlx(rename = "interest")]
    pub annual_rate_percent: Percent,
    #[serde(rename = "emi")]
    #[sqlx(rename = "emi")]
    pub monthly_installment: Money,
    #[serde(rename = "amount")]
    #[sqlx(rename = "amount")]
    pub total_amount: Money,
}

impl LoanTerms {
    /// Validate the request, then price it
    pub fn derive(request: &LoanRequest) -> LoanResult<Self> {
        request.validate()?;

        let annual_rate_percent = rate_for_principal(request.principal);
        let monthly_installment =
            compute_emi(request.principal, request.term_months, annual_rate_percent).map_err(
                |e| match e {
                    LoanError::InvalidArgument(msg) => LoanError::Validation(msg),
                    other => other,
                },
            )?;

        Ok(Self {
            principal: request.principal,
            term_months: request.term_months,
            annual_rate_percent,
            monthly_installment,
            total_amount: monthly_installment * f64::from(request.term_months),
        })
    }
}

/// Loan model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Loan {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub borrower_id: Uuid,
    pub granted_by: Option<Uuid>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub terms: LoanTerms,
    pub status: LoanStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Signal that a loan was mutated, carrying the time to stamp it with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Touched {
    pub at: DateTime<Utc>,
}

/// Kind of mutation recorded in a loan's history
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_change", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanChange {
    Created,
    Decided,
    Edited,
}

/// Snapshot of a loan taken after each mutation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoanHistoryEntry {
    pub id: i64,
    pub loan_id: Uuid,
    pub change_type: LoanChange,
    pub changed_by: Option<Uuid>,
    pub status: LoanStatus,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub terms: LoanTerms,
    pub recorded_at: DateTime<Utc>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request from an agent to open a loan for a customer
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    /// Borrower email or id
    pub user: Option<String>,
    pub principal: Option<Money>,
    pub months: Option<i32>,
}

impl CreateLoanRequest {
    /// Split into the borrower reference and the loan request, rejecting missing fields
    pub fn into_parts(self) -> LoanResult<(String, LoanRequest)> {
        let user = self
            .user
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| LoanError::Validation("Field 'user' is required".to_string()))?;
        let principal = self
            .principal
            .ok_or_else(|| LoanError::Validation("Field 'principal' is required".to_string()))?;
        let months = self
            .months
            .ok_or_else(|| LoanError::Validation("Field 'months' is required".to_string()))?;

        Ok((user, LoanRequest::new(principal, months)))
    }
}

/// Request to change a loan's principal and/or term
#[derive(Debug, Default, Deserialize)]
pub struct EditLoanRequest {
    pub principal: Option<Money>,
    pub months: Option<i32>,
}

impl EditLoanRequest {
    /// Fill omitted fields from the loan's current terms
    pub fn merge_onto(&self, current: &LoanTerms) -> LoanRequest {
        LoanRequest::new(
            self.principal.unwrap_or(current.principal),
            self.months.unwrap_or(current.term_months),
        )
    }
}

/// Request to approve or reject a loan
#[derive(Debug, Deserialize)]
pub struct DecideLoanRequest {
    pub status: String,
}

/// Query for listing loans
#[derive(Debug, Default, Deserialize)]
pub struct ListLoansQuery {
    pub status: Option<LoanStatus>,
}

/// Query for a quote
#[derive(Debug, Deserialize)]
pub struct LoanQuoteQuery {
    pub principal: Money,
    pub months: i32,
}

/// Preview of a loan's terms without persisting anything
#[derive(Debug, Serialize)]
pub struct LoanQuote {
    #[serde(flatten)]
    pub terms: LoanTerms,
    pub emi_rounded: Money,
    pub amount_rounded: Money,
}

impl From<LoanTerms> for LoanQuote {
    fn from(terms: LoanTerms) -> Self {
        Self {
            emi_rounded: round_currency(terms.monthly_installment),
            amount_rounded: round_currency(terms.total_amount),
            terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parsing() {
        assert_eq!("APPROVED".parse::<Decision>().unwrap(), Decision::Approved);
        assert_eq!("REJECTED".parse::<Decision>().unwrap(), Decision::Rejected);
        assert!(matches!(
            "NEW".parse::<Decision>(),
            Err(LoanError::Validation(_))
        ));
        assert!("ACCEPTED".parse::<Decision>().is_err());
        assert!("approved".parse::<Decision>().is_err());
    }

    #[test]
    fn test_request_validation() {
        assert!(LoanRequest::new(10_000.0, 12).validate().is_ok());
        assert!(matches!(
            LoanRequest::new(9_999.0, 12).validate(),
            Err(LoanError::Validation(_))
        ));
        assert!(matches!(
            LoanRequest::new(50_000.0, 0).validate(),
            Err(LoanError::Validation(_))
        ));
        assert!(LoanRequest::new(f64::NAN, 12).validate().is_err());
    }

    #[test]
    fn test_terms_total_uses_unrounded_emi() {
        let terms = LoanTerms::derive(&LoanRequest::new(1_000_000.0, 60)).unwrap();
        assert_eq!(terms.annual_rate_percent, 10.0);
        assert_eq!(terms.total_amount, terms.monthly_installment * 60.0);
    }

    #[test]
    fn test_terms_serialize_with_api_field_names() {
        let terms = LoanTerms::derive(&LoanRequest::new(20_000.0, 12)).unwrap();
        let json = serde_json::to_value(terms).unwrap();
        for field in ["principal", "interest", "months", "emi", "amount"] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&LoanStatus::Approved).unwrap();
        assert_eq!(json, "\"APPROVED\"");
        let status: LoanStatus = serde_json::from_str("\"REJECTED\"").unwrap();
        assert_eq!(status, LoanStatus::Rejected);
    }

    #[test]
    fn test_create_request_missing_fields() {
        let request = CreateLoanRequest {
            user: Some("customer@example.com".to_string()),
            principal: None,
            months: Some(12),
        };
        assert!(matches!(
            request.into_parts(),
            Err(LoanError::Validation(_))
        ));

        let request = CreateLoanRequest {
            user: Some("   ".to_string()),
            principal: Some(20_000.0),
            months: Some(12),
        };
        assert!(request.into_parts().is_err());
    }

    #[test]
    fn test_edit_request_merges_current_terms() {
        let current = LoanTerms::derive(&LoanRequest::new(50_000.0, 24)).unwrap();
        let edit = EditLoanRequest {
            principal: Some(75_000.0),
            months: None,
        };
        assert_eq!(edit.merge_onto(&current), LoanRequest::new(75_000.0, 24));
    }
}
