//! Interest-rate tiers and EMI arithmetic
//!
//! Everything here is pure: no clock, no I/O. Amounts are `f64` and are never
//! rounded mid-calculation, so `total = emi * months` always uses the
//! unrounded installment.

use super::error::{LoanError, LoanResult};

/// Monetary amount in currency units
pub type Money = f64;

/// Annual interest rate as a percentage (`8.45` means 8.45%)
pub type Percent = f64;

/// Smallest principal a loan may be created or edited with
pub const MIN_PRINCIPAL: Money = 10_000.0;

/// Lower bound of the middle rate tier
pub const MID_TIER_FLOOR: Money = 1_000_000.0;

/// Lower bound of the top rate tier
pub const TOP_TIER_FLOOR: Money = 2_500_000.0;

pub const BASE_RATE: Percent = 8.45;
pub const MID_RATE: Percent = 10.0;
pub const TOP_RATE: Percent = 12.0;

/// Hours counted per month of term when computing a loan's end date
pub const HOURS_PER_MONTH: i64 = 730;

/// Map a principal amount to its annual interest rate.
///
/// Amounts below [`MIN_PRINCIPAL`] fall into the base tier; callers are
/// expected to have rejected them already.
pub fn rate_for_principal(principal: Money) -> Percent {
    if principal >= TOP_TIER_FLOOR {
        TOP_RATE
    } else if principal >= MID_TIER_FLOOR {
        MID_RATE
    } else {
        BASE_RATE
    }
}

/// Compute the equated monthly installment for an amortizing loan.
///
/// `emi = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r = rate / 1200`.
pub fn compute_emi(
    principal: Money,
    term_months: i32,
    annual_rate_percent: Percent,
) -> LoanResult<Money> {
    if term_months < 1 {
        return Err(LoanError::InvalidArgument(format!(
            "term must be at least one month, got {}",
            term_months
        )));
    }
    if !annual_rate_percent.is_finite() || annual_rate_percent <= 0.0 {
        return Err(LoanError::InvalidArgument(format!(
            "annual rate must be a positive number, got {}",
            annual_rate_percent
        )));
    }
    if !principal.is_finite() || principal <= 0.0 {
        return Err(LoanError::InvalidArgument(format!(
            "principal must be a positive number, got {}",
            principal
        )));
    }

    let rate_per_month = annual_rate_percent / 1200.0;
    let numerator = (1.0 + rate_per_month).powi(term_months);
    let emi = principal * rate_per_month * (numerator / (numerator - 1.0));

    if !emi.is_finite() {
        return Err(LoanError::InvalidArgument(format!(
            "installment overflowed for principal {} over {} months",
            principal, term_months
        )));
    }

    Ok(emi)
}

/// Round an amount to cents for display. Stored values are never rounded.
pub fn round_currency(value: Money) -> Money {
    (value * 100.0).round() / 100.0
}
