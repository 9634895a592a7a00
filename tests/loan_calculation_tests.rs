//! Loan Pricing Tests
//!
//! Rate tiers, installment arithmetic and the derived terms of a request.

use loanbook_server::loan::{
    compute_emi, rate_for_principal, round_currency, LoanError, LoanQuote, LoanRequest, LoanTerms,
};

fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

// ============================================================================
// Rate Tier Tests
// ============================================================================

#[test]
fn test_base_tier() {
    assert_eq!(rate_for_principal(10_000.0), 8.45);
    assert_eq!(rate_for_principal(500_000.0), 8.45);
    assert_eq!(rate_for_principal(999_999.0), 8.45);
}

#[test]
fn test_middle_tier() {
    assert_eq!(rate_for_principal(1_000_000.0), 10.0);
    assert_eq!(rate_for_principal(1_750_000.0), 10.0);
    assert_eq!(rate_for_principal(2_499_999.0), 10.0);
}

#[test]
fn test_top_tier() {
    assert_eq!(rate_for_principal(2_500_000.0), 12.0);
    assert_eq!(rate_for_principal(10_000_000.0), 12.0);
}

#[test]
fn test_rate_never_decreases_with_principal() {
    let mut last = rate_for_principal(10_000.0);
    let mut principal = 10_000.0;
    while principal < 5_000_000.0 {
        let rate = rate_for_principal(principal);
        assert!(rate >= last, "rate dropped at {}", principal);
        last = rate;
        principal += 37_500.0;
    }
}

// ============================================================================
// Installment Tests
// ============================================================================

#[test]
fn test_emi_known_values() {
    let emi = compute_emi(100_000.0, 12, 8.45).unwrap();
    assert!(approx(emi, 8_719.66, 0.01), "emi was {}", emi);

    let emi = compute_emi(2_500_000.0, 120, 12.0).unwrap();
    assert!(approx(emi, 35_867.74, 0.01), "emi was {}", emi);
}

#[test]
fn test_emi_times_term_exceeds_principal() {
    for (principal, months) in [(10_000.0, 1), (50_000.0, 24), (1_200_000.0, 240)] {
        let rate = rate_for_principal(principal);
        let emi = compute_emi(principal, months, rate).unwrap();
        assert!(emi * f64::from(months) > principal);
    }
}

#[test]
fn test_emi_increases_with_principal() {
    let mut last = compute_emi(10_000.0, 60, 10.0).unwrap();
    let mut principal = 10_000.0;
    while principal < 5_000_000.0 {
        principal += 41_250.0;
        let emi = compute_emi(principal, 60, 10.0).unwrap();
        assert!(emi > last, "emi did not grow at {}", principal);
        last = emi;
    }
}

#[test]
fn test_derived_installment_grows_across_rate_tiers() {
    let mut last = 0.0;
    for principal in [10_000.0, 999_999.0, 1_000_000.0, 2_499_999.0, 2_500_000.0, 4_000_000.0] {
        let terms = LoanTerms::derive(&LoanRequest::new(principal, 36)).unwrap();
        assert!(
            terms.monthly_installment > last,
            "installment did not grow at {}",
            principal
        );
        last = terms.monthly_installment;
    }
}

#[test]
fn test_emi_rejects_bad_arguments() {
    assert!(matches!(
        compute_emi(100_000.0, 0, 8.45),
        Err(LoanError::InvalidArgument(_))
    ));
    assert!(matches!(
        compute_emi(100_000.0, -3, 8.45),
        Err(LoanError::InvalidArgument(_))
    ));
    assert!(matches!(
        compute_emi(100_000.0, 12, 0.0),
        Err(LoanError::InvalidArgument(_))
    ));
    assert!(matches!(
        compute_emi(100_000.0, 12, -1.0),
        Err(LoanError::InvalidArgument(_))
    ));
}

// ============================================================================
// Derived Terms Tests
// ============================================================================

#[test]
fn test_terms_total_uses_unrounded_installment() {
    let terms = LoanTerms::derive(&LoanRequest::new(50_000.0, 24)).unwrap();

    assert_eq!(terms.annual_rate_percent, 8.45);
    assert_eq!(terms.total_amount, terms.monthly_installment * 24.0);
    assert!(approx(terms.total_amount, 54_519.37, 0.01));
}

#[test]
fn test_terms_single_month_at_minimum() {
    let terms = LoanTerms::derive(&LoanRequest::new(10_000.0, 1)).unwrap();
    assert!(approx(terms.monthly_installment, 10_070.42, 0.01));
    assert_eq!(terms.total_amount, terms.monthly_installment);
}

#[test]
fn test_terms_reject_principal_below_minimum() {
    let err = LoanTerms::derive(&LoanRequest::new(9_999.99, 12)).unwrap_err();
    assert!(matches!(err, LoanError::Validation(_)));
}

#[test]
fn test_terms_reject_non_positive_term() {
    for months in [0, -1] {
        let err = LoanTerms::derive(&LoanRequest::new(100_000.0, months)).unwrap_err();
        assert!(matches!(err, LoanError::Validation(_)));
    }
}

#[test]
fn test_terms_reject_non_finite_principal() {
    let err = LoanTerms::derive(&LoanRequest::new(f64::NAN, 12)).unwrap_err();
    assert!(matches!(err, LoanError::Validation(_)));
}

// ============================================================================
// Quote Tests
// ============================================================================

#[test]
fn test_quote_rounds_for_display_only() {
    let terms = LoanTerms::derive(&LoanRequest::new(100_000.0, 12)).unwrap();
    let quote = LoanQuote::from(terms);

    assert_eq!(quote.emi_rounded, round_currency(terms.monthly_installment));
    assert_eq!(quote.terms, terms);
    assert_eq!(quote.emi_rounded, 8_719.66);
}

#[test]
fn test_quote_json_fields() {
    let terms = LoanTerms::derive(&LoanRequest::new(1_000_000.0, 60)).unwrap();
    let json = serde_json::to_value(LoanQuote::from(terms)).unwrap();

    assert_eq!(json["principal"], 1_000_000.0);
    assert_eq!(json["months"], 60);
    assert_eq!(json["interest"], 10.0);
    assert_eq!(json["emi_rounded"], 21_247.04);
    assert!(json.get("emi").is_some());
    assert!(json.get("amount").is_some());
}
