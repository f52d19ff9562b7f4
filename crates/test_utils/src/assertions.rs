//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for rating results that give
//! more meaningful error messages than standard assertions.

use core_kernel::{Money, Percent};
use domain_rating::{RatingOutcome, RatingResult};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a percentage equals the expected decimal value
pub fn assert_percent_eq(actual: Percent, expected: Decimal) {
    assert_eq!(
        actual.value(),
        expected,
        "Expected {}%, got {}",
        expected,
        actual
    );
}

/// Asserts the invariants every outcome must satisfy
///
/// - the combined percentage is on the 0-100 scale
/// - the unrounded combined value is at least the largest region rating
/// - the payout equals weeks times the weekly rate, to the cent
pub fn assert_outcome_consistent(outcome: &RatingOutcome) {
    let combined = outcome.combination.combined_percent.value();
    assert!(
        Percent::in_range(combined),
        "Combined percent {} is outside 0-100",
        combined
    );

    let largest = outcome
        .combination
        .regions
        .iter()
        .map(|r| r.value)
        .max()
        .unwrap_or_default();
    assert!(
        outcome.combination.unrounded >= largest,
        "Combined value {} is below the largest region rating {}",
        outcome.combination.unrounded,
        largest
    );

    let expected = outcome
        .payout
        .weekly_rate
        .multiply(outcome.payout.weeks)
        .round_to_currency();
    assert_eq!(
        outcome.payout.total_payout, expected,
        "Payout {} does not match {} weeks at {}",
        outcome.payout.total_payout, outcome.payout.weeks, outcome.payout.weekly_rate
    );
}

/// Asserts the invariants of a full rating result
pub fn assert_result_consistent(result: &RatingResult) {
    for trace in &result.impairments {
        assert!(
            Percent::in_range(trace.adjustment.final_rating.value()),
            "Final rating of finding {} is outside 0-100",
            trace.index
        );
    }
    assert_outcome_consistent(&result.outcome);
    if let Some(apportioned) = &result.apportioned {
        assert_outcome_consistent(apportioned);
        assert!(
            apportioned.combination.combined_percent <= result.combined_percent(),
            "Apportioned rating exceeds the unapportioned rating"
        );
    }

    let medical = &result.future_medical;
    assert_eq!(
        medical.items.len(),
        result.impairments.len(),
        "Every impairment needs a medical cost estimate"
    );
    let annual: Decimal = medical.items.iter().map(|i| i.annual_cost.amount()).sum();
    assert_eq!(
        medical.total_annual_cost.amount(),
        annual,
        "Annual medical total does not match its items"
    );
    assert!(
        medical.total_projected_cost.amount() >= medical.total_annual_cost.amount(),
        "Projected medical cost {} is below one year's cost {}",
        medical.total_projected_cost,
        medical.total_annual_cost
    );
}
