//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating rating inputs that satisfy
//! the input invariants, restricted to body parts and occupations the
//! fixture tables can rate.

use domain_rating::{ClaimantContext, ImpairmentFinding, RatingRequest};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Body parts that classify to a row present for every fixture group
pub const RATABLE_BODY_PARTS: [&str; 10] = [
    "lower back",
    "cervical spine",
    "left shoulder",
    "right elbow",
    "wrist",
    "right hand",
    "left knee",
    "ankle",
    "hip",
    "jaw",
];

/// Occupation titles that classify to a group with variant columns
pub const RATABLE_OCCUPATIONS: [&str; 6] = [
    "Packer",
    "Clerk, General Office",
    "Carpenter",
    "Software Engineer",
    "Registered Nurse",
    "Night Stocker",
];

/// Strategy for WPI values on the 0-100 scale with two decimal places
pub fn wpi_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for pain add-ons, including values above the cap
pub fn pain_add_on_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=60i64).prop_map(|n| Decimal::new(n, 1))
}

/// Strategy for apportionment percentages, zero half of the time
pub fn apportionment_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![Just(Decimal::ZERO), (1i64..=100i64).prop_map(Decimal::from)]
}

/// Strategy for ages at injury
pub fn age_strategy() -> impl Strategy<Value = i32> {
    16i32..=80i32
}

/// Strategy for a single ratable finding
pub fn finding_strategy() -> impl Strategy<Value = ImpairmentFinding> {
    (
        prop::sample::select(RATABLE_BODY_PARTS.to_vec()),
        wpi_strategy(),
        pain_add_on_strategy(),
        apportionment_strategy(),
    )
        .prop_map(|(body_part, wpi, pain, apportionment)| {
            ImpairmentFinding::new(body_part, wpi)
                .with_pain_add_on(pain)
                .with_apportionment(apportionment)
        })
}

/// Strategy for a ratable request with 1 to 6 findings
pub fn request_strategy() -> impl Strategy<Value = RatingRequest> {
    (
        prop::sample::select(RATABLE_OCCUPATIONS.to_vec()),
        age_strategy(),
        prop::collection::vec(finding_strategy(), 1..=6),
    )
        .prop_map(|(occupation, age, findings)| {
            RatingRequest::new(ClaimantContext::new(occupation, age), findings)
        })
}
