//! Loan Lifecycle Scenario Tests
//!
//! Walks loans through request, decision and edit with a pinned clock.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use loanbook_server::loan::{
    Clock, Decision, EditLoanRequest, FixedClock, Loan, LoanError, LoanRequest, LoanStatus,
};

fn start_clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
}

fn open_loan(clock: &FixedClock, principal: f64, months: i32) -> Loan {
    Loan::create(
        LoanRequest::new(principal, months),
        Uuid::new_v4(),
        Uuid::new_v4(),
        clock,
    )
    .unwrap()
}

// ============================================================================
// Creation Tests
// ============================================================================

#[test]
fn test_new_loan_term_dates() {
    let clock = start_clock();
    let loan = open_loan(&clock, 100_000.0, 12);

    assert_eq!(loan.status, LoanStatus::New);
    assert_eq!(loan.start_date, clock.now());
    assert_eq!(loan.end_date - loan.start_date, Duration::hours(12 * 730));
    assert_eq!(loan.modified_date, loan.start_date);
}

#[test]
fn test_new_loans_get_distinct_ids() {
    let clock = start_clock();
    let a = open_loan(&clock, 100_000.0, 12);
    let b = open_loan(&clock, 100_000.0, 12);
    assert_ne!(a.id, b.id);
}

// ============================================================================
// Workflow Tests
// ============================================================================

#[test]
fn test_reject_edit_approve_workflow() {
    let clock = start_clock();
    let mut loan = open_loan(&clock, 100_000.0, 12);

    clock.advance(Duration::days(1));
    let touched = loan.decide(Decision::Rejected, &clock);
    assert_eq!(loan.status, LoanStatus::Rejected);
    assert_eq!(loan.modified_date, touched.at);

    clock.advance(Duration::days(1));
    let request = EditLoanRequest {
        principal: Some(1_200_000.0),
        months: None,
    }
    .merge_onto(&loan.terms);
    let touched = loan.edit(request, &clock).unwrap();

    assert_eq!(loan.status, LoanStatus::New);
    assert_eq!(loan.terms.principal, 1_200_000.0);
    assert_eq!(loan.terms.term_months, 12);
    assert_eq!(loan.terms.annual_rate_percent, 10.0);
    assert_eq!(loan.start_date, touched.at);
    assert_eq!(loan.end_date - loan.start_date, Duration::hours(12 * 730));

    clock.advance(Duration::days(1));
    loan.decide(Decision::Approved, &clock);
    assert_eq!(loan.status, LoanStatus::Approved);
    assert!(!loan.is_editable());
}

#[test]
fn test_approved_loan_is_frozen() {
    let clock = start_clock();
    let mut loan = open_loan(&clock, 100_000.0, 12);
    loan.decide(Decision::Approved, &clock);
    let before = loan.clone();

    clock.advance(Duration::hours(1));
    let err = loan
        .edit(LoanRequest::new(200_000.0, 24), &clock)
        .unwrap_err();

    assert!(matches!(err, LoanError::InvalidState(_)));
    assert_eq!(loan, before);
}

#[test]
fn test_approved_check_precedes_value_check() {
    let clock = start_clock();
    let mut loan = open_loan(&clock, 100_000.0, 12);
    loan.decide(Decision::Approved, &clock);

    let err = loan.edit(LoanRequest::new(5.0, 0), &clock).unwrap_err();
    assert!(matches!(err, LoanError::InvalidState(_)));
}

#[test]
fn test_later_decision_wins() {
    let clock = start_clock();
    let mut loan = open_loan(&clock, 100_000.0, 12);

    loan.decide(Decision::Approved, &clock);
    clock.advance(Duration::minutes(5));
    let touched = loan.decide(Decision::Rejected, &clock);

    assert_eq!(loan.status, LoanStatus::Rejected);
    assert_eq!(loan.modified_date, touched.at);
}

#[test]
fn test_modified_date_tracks_every_mutation() {
    let clock = start_clock();
    let mut loan = open_loan(&clock, 50_000.0, 6);
    let mut last = loan.modified_date;

    for step in 0..3 {
        clock.advance(Duration::minutes(10));
        let touched = if step % 2 == 0 {
            loan.decide(Decision::Rejected, &clock)
        } else {
            loan.edit(LoanRequest::new(60_000.0 + f64::from(step), 6), &clock)
                .unwrap()
        };
        assert!(touched.at > last);
        assert_eq!(loan.modified_date, touched.at);
        last = touched.at;
    }
}

// ============================================================================
// Serialization Tests
// ============================================================================

#[test]
fn test_loan_json_shape() {
    let clock = start_clock();
    let loan = open_loan(&clock, 100_000.0, 12);
    let json = serde_json::to_value(&loan).unwrap();

    assert_eq!(json["status"], "NEW");
    assert_eq!(json["user"], loan.borrower_id.to_string());
    assert_eq!(json["principal"], 100_000.0);
    assert_eq!(json["months"], 12);
    assert_eq!(json["interest"], 8.45);
    assert!(json.get("emi").is_some());
    assert!(json.get("amount").is_some());
    assert!(json.get("start_date").is_some());
    assert!(json.get("end_date").is_some());
    assert!(json.get("modified_date").is_some());
}
