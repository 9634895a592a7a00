//! Loan lifecycle transitions
//!
//! `NEW` is the initial status. `APPROVED` and `REJECTED` are only ever set
//! by [`Loan::decide`], which may be called again on an already-decided loan
//! (the last decision wins). Editing is refused once a loan is `APPROVED`; a
//! `REJECTED` loan may be edited, which puts it back to `NEW`.
//!
//! These functions only mutate the in-memory [`Loan`]. Persisting the result
//! is the caller's job; every mutation returns a [`Touched`] carrying the
//! timestamp already written to `modified_date`.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::calc::HOURS_PER_MONTH;
use super::error::{LoanError, LoanResult};
use super::model::{Decision, Loan, LoanRequest, LoanStatus, LoanTerms, Touched};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to an instant that only moves when advanced
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// End of a loan's term: 730 hours per month, not calendar months
pub fn end_date_for(start: DateTime<Utc>, term_months: i32) -> LoanResult<DateTime<Utc>> {
    Duration::try_hours(i64::from(term_months) * HOURS_PER_MONTH)
        .and_then(|term| start.checked_add_signed(term))
        .ok_or_else(|| {
            LoanError::Validation(format!("Loan term of {} months is too long", term_months))
        })
}

impl Loan {
    /// Open a new loan in `NEW` status starting now
    pub fn create(
        request: LoanRequest,
        borrower_id: Uuid,
        granted_by: Uuid,
        clock: &dyn Clock,
    ) -> LoanResult<Self> {
        let terms = LoanTerms::derive(&request)?;
        let now = clock.now();
        let end_date = end_date_for(now, terms.term_months)?;

        Ok(Self {
            id: Uuid::new_v4(),
            borrower_id,
            granted_by: Some(granted_by),
            terms,
            status: LoanStatus::New,
            start_date: now,
            end_date,
            modified_date: now,
        })
    }

    /// Record an approval or rejection, whatever the current status
    pub fn decide(&mut self, decision: Decision, clock: &dyn Clock) -> Touched {
        let now = clock.now();
        self.status = decision.into();
        self.modified_date = now;
        Touched { at: now }
    }

    /// Replace the loan's terms and resubmit it as `NEW`
    pub fn edit(&mut self, request: LoanRequest, clock: &dyn Clock) -> LoanResult<Touched> {
        if !self.is_editable() {
            return Err(LoanError::InvalidState(format!(
                "Loan {} is already approved and cannot be edited",
                self.id
            )));
        }

        let terms = LoanTerms::derive(&request)?;
        let now = clock.now();
        let end_date = end_date_for(now, terms.term_months)?;

        self.terms = terms;
        self.start_date = now;
        self.end_date = end_date;
        self.status = LoanStatus::New;
        self.modified_date = now;

        Ok(Touched { at: now })
    }

    pub fn is_editable(&self) -> bool {
        match self.status {
            LoanStatus::New | LoanStatus::Rejected => true,
            LoanStatus::Approved => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn new_loan(clock: &FixedClock) -> Loan {
        Loan::create(
            LoanRequest::new(50_000.0, 12),
            Uuid::new_v4(),
            Uuid::new_v4(),
            clock,
        )
        .unwrap()
    }

    #[test]
    fn test_create_sets_new_status_and_dates() {
        let clock = clock();
        let loan = new_loan(&clock);

        assert_eq!(loan.status, LoanStatus::New);
        assert_eq!(loan.start_date, clock.now());
        assert_eq!(loan.modified_date, clock.now());
        assert_eq!(loan.end_date - loan.start_date, Duration::hours(12 * 730));
        assert_eq!(loan.terms.annual_rate_percent, 8.45);
    }

    #[test]
    fn test_create_rejects_principal_below_floor() {
        let clock = clock();
        let result = Loan::create(
            LoanRequest::new(9_999.0, 12),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &clock,
        );
        assert!(matches!(result, Err(LoanError::Validation(_))));
    }

    #[test]
    fn test_create_rejects_zero_term() {
        let clock = clock();
        let result = Loan::create(
            LoanRequest::new(20_000.0, 0),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &clock,
        );
        assert!(matches!(result, Err(LoanError::Validation(_))));
    }

    #[test]
    fn test_create_rejects_unrepresentable_end_date() {
        let clock = clock();
        let result = Loan::create(
            LoanRequest::new(20_000.0, i32::MAX),
            Uuid::new_v4(),
            Uuid::new_v4(),
            &clock,
        );
        assert!(matches!(result, Err(LoanError::Validation(_))));
    }

    #[test]
    fn test_decide_overwrites_status_and_touches() {
        let clock = clock();
        let mut loan = new_loan(&clock);

        clock.advance(Duration::minutes(5));
        let touched = loan.decide(Decision::Approved, &clock);
        assert_eq!(loan.status, LoanStatus::Approved);
        assert_eq!(touched.at, clock.now());
        assert_eq!(loan.modified_date, clock.now());

        loan.decide(Decision::Rejected, &clock);
        assert_eq!(loan.status, LoanStatus::Rejected);
    }

    #[test]
    fn test_edit_approved_loan_fails_without_changes() {
        let clock = clock();
        let mut loan = new_loan(&clock);
        loan.decide(Decision::Approved, &clock);
        let before = loan.clone();

        clock.advance(Duration::hours(1));
        let result = loan.edit(LoanRequest::new(1.0, 0), &clock);

        assert!(matches!(result, Err(LoanError::InvalidState(_))));
        assert_eq!(loan, before);
    }

    #[test]
    fn test_edit_rejected_loan_resubmits() {
        let clock = clock();
        let mut loan = new_loan(&clock);
        loan.decide(Decision::Rejected, &clock);

        clock.advance(Duration::days(2));
        let touched = loan.edit(LoanRequest::new(1_500_000.0, 36), &clock).unwrap();

        assert_eq!(loan.status, LoanStatus::New);
        assert_eq!(loan.terms.annual_rate_percent, 10.0);
        assert_eq!(loan.terms.term_months, 36);
        assert_eq!(loan.start_date, touched.at);
        assert_eq!(loan.end_date - loan.start_date, Duration::hours(36 * 730));
    }

    #[test]
    fn test_invalid_edit_leaves_loan_untouched() {
        let clock = clock();
        let mut loan = new_loan(&clock);
        let before = loan.clone();

        clock.advance(Duration::hours(1));
        let result = loan.edit(LoanRequest::new(5_000.0, 12), &clock);

        assert!(matches!(result, Err(LoanError::Validation(_))));
        assert_eq!(loan, before);
    }
}
