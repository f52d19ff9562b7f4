//! Combined values
//!
//! Ratings are never added. Two ratings combine as
//! `a + b * (100 - a) / 100` with `a >= b`, so each further impairment only
//! applies to the capacity the larger ones left intact. Sets are sorted
//! descending and folded left, first within each body region and then
//! across regions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use core_kernel::Percent;
use crate::error::{RatingError, RatingStage};
use crate::finding::BodyRegion;

/// An adjusted rating tagged with its body region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustedImpairment {
    pub body_region: BodyRegion,
    pub final_rating: Percent,
}

impl AdjustedImpairment {
    pub fn new(body_region: BodyRegion, final_rating: Percent) -> Self {
        Self {
            body_region,
            final_rating,
        }
    }
}

/// One application of the combined values formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationStep {
    pub larger: Decimal,
    pub smaller: Decimal,
    pub result: Decimal,
}

impl fmt::Display for CombinationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} C {} = {}",
            self.larger.normalize(),
            self.smaller.normalize(),
            self.result.normalize()
        )
    }
}

/// Combined rating of one body region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRating {
    pub region: BodyRegion,
    pub impairment_count: usize,
    pub value: Decimal,
    pub steps: Vec<CombinationStep>,
}

/// Result of the two-level combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRating {
    /// Regions that had at least one impairment, in region order
    pub regions: Vec<RegionRating>,
    /// Steps of the cross-region combination
    pub steps: Vec<CombinationStep>,
    /// Combined value before rounding
    pub unrounded: Decimal,
    pub combined_percent: Percent,
}

/// Combines two ratings; argument order does not matter
pub fn combine_pair(a: Decimal, b: Decimal) -> Decimal {
    let (larger, smaller) = if a >= b { (a, b) } else { (b, a) };
    larger + smaller * (Decimal::ONE_HUNDRED - larger) / Decimal::ONE_HUNDRED
}

/// Sorts descending (stable) and folds with [`combine_pair`]
///
/// An empty set combines to zero; a single value passes through unchanged.
pub fn combine_values(values: &[Decimal]) -> (Decimal, Vec<CombinationStep>) {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));

    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return (Decimal::ZERO, Vec::new());
    };

    iter.fold((first, Vec::new()), |(acc, mut steps), value| {
        let result = combine_pair(acc, value);
        steps.push(CombinationStep {
            larger: acc,
            smaller: value,
            result,
        });
        (result, steps)
    })
}

/// Combines within each region, then across the regions present, and rounds
/// half-up to `precision` decimal places
pub fn combine(
    impairments: &[AdjustedImpairment],
    precision: u32,
) -> Result<CombinedRating, RatingError> {
    let regions: Vec<RegionRating> = BodyRegion::ALL
        .iter()
        .filter_map(|region| {
            let values: Vec<Decimal> = impairments
                .iter()
                .filter(|i| i.body_region == *region)
                .map(|i| i.final_rating.value())
                .collect();
            if values.is_empty() {
                return None;
            }
            let (value, steps) = combine_values(&values);
            Some(RegionRating {
                region: *region,
                impairment_count: values.len(),
                value,
                steps,
            })
        })
        .collect();

    let region_values: Vec<Decimal> = regions.iter().map(|r| r.value).collect();
    let (unrounded, steps) = combine_values(&region_values);

    let combined_percent = Percent::new(unrounded)
        .map_err(|_| RatingError::RatingOutOfRange {
            stage: RatingStage::Combination,
            value: unrounded,
        })?
        .round_half_up(precision);

    debug!(
        regions = regions.len(),
        %unrounded,
        combined = %combined_percent,
        "Ratings combined"
    );

    Ok(CombinedRating {
        regions,
        steps,
        unrounded,
        combined_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn impairment(region: BodyRegion, value: Decimal) -> AdjustedImpairment {
        AdjustedImpairment::new(region, Percent::new(value).unwrap())
    }

    #[test]
    fn test_combine_30_and_20() {
        assert_eq!(combine_pair(dec!(30), dec!(20)), dec!(44));
        assert_eq!(combine_pair(dec!(20), dec!(30)), dec!(44));
    }

    #[test]
    fn test_identity_and_absorbing_values() {
        assert_eq!(combine_pair(dec!(37), dec!(0)), dec!(37));
        assert_eq!(combine_pair(dec!(100), dec!(65)), dec!(100));
    }

    #[test]
    fn test_fold_descending() {
        // 50 C 20 = 60, 60 C 10 = 64
        let (value, steps) = combine_values(&[dec!(10), dec!(50), dec!(20)]);
        assert_eq!(value, dec!(64));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].to_string(), "50 C 20 = 60");
        assert_eq!(steps[1].to_string(), "60 C 10 = 64");
    }

    #[test]
    fn test_single_impairment_passes_through() {
        let combined = combine(&[impairment(BodyRegion::Spine, dec!(10))], 0).unwrap();
        assert_eq!(combined.combined_percent.value(), dec!(10));
        assert_eq!(combined.regions.len(), 1);
        assert!(combined.regions[0].steps.is_empty());
        assert!(combined.steps.is_empty());
    }

    #[test]
    fn test_two_regions() {
        let combined = combine(
            &[
                impairment(BodyRegion::UpperExtremity, dec!(20)),
                impairment(BodyRegion::Spine, dec!(30)),
            ],
            0,
        )
        .unwrap();

        assert_eq!(combined.combined_percent.value(), dec!(44));
        assert_eq!(combined.regions[0].region, BodyRegion::Spine);
        assert_eq!(combined.regions[1].region, BodyRegion::UpperExtremity);
        assert_eq!(combined.steps[0].to_string(), "30 C 20 = 44");
    }

    #[test]
    fn test_within_region_before_across() {
        // Spine: 20 C 10 = 28; then 28 C 15 = 38.8
        let combined = combine(
            &[
                impairment(BodyRegion::Spine, dec!(10)),
                impairment(BodyRegion::LowerExtremity, dec!(15)),
                impairment(BodyRegion::Spine, dec!(20)),
            ],
            0,
        )
        .unwrap();

        assert_eq!(combined.regions[0].value, dec!(28));
        assert_eq!(combined.regions[0].impairment_count, 2);
        assert_eq!(combined.unrounded, dec!(38.8));
        assert_eq!(combined.combined_percent.value(), dec!(39));
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 10 C 5 = 14.5
        let combined = combine(
            &[
                impairment(BodyRegion::Spine, dec!(10)),
                impairment(BodyRegion::Other, dec!(5)),
            ],
            0,
        )
        .unwrap();
        assert_eq!(combined.unrounded, dec!(14.5));
        assert_eq!(combined.combined_percent.value(), dec!(15));

        let combined = combine(
            &[
                impairment(BodyRegion::Spine, dec!(10)),
                impairment(BodyRegion::Other, dec!(5)),
            ],
            1,
        )
        .unwrap();
        assert_eq!(combined.combined_percent.value(), dec!(14.5));
    }

    #[test]
    fn test_empty_set_is_zero() {
        let combined = combine(&[], 0).unwrap();
        assert_eq!(combined.combined_percent, Percent::ZERO);
        assert!(combined.regions.is_empty());
    }
}
