//! Adjustment pipeline: pain add-on, occupational and age adjustment

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::Percent;
use crate::error::{RatingError, RatingStage};
use crate::ports::LookupProvider;
use crate::schedule::ScheduleConfig;
use crate::tables::{AgeBracket, VariantLetter};

/// Inputs of a single impairment's adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentInput {
    pub wpi: Decimal,
    pub pain_add_on: Decimal,
    pub group_number: u16,
    pub variant: VariantLetter,
    pub age_at_injury: i32,
}

/// Every intermediate value of one adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentTrace {
    /// Pain add-on after the cap
    pub effective_add_on: Decimal,
    /// WPI plus the effective add-on
    pub base_rating: Decimal,
    /// Base rating times the earning capacity factor
    pub adjusted_rating: Decimal,
    /// Occupational table bucket the adjusted rating resolved to
    pub occupational_bucket: Decimal,
    pub occupational_rating: Decimal,
    pub age_bracket: AgeBracket,
    /// Age table bucket the occupational rating resolved to
    pub age_bucket: Decimal,
    pub final_rating: Percent,
}

/// Runs pain capping, the occupational lookup and the age lookup
///
/// The value read from each table is the next stage's rating. Neither step
/// interpolates between buckets.
pub fn adjust<P: LookupProvider + ?Sized>(
    tables: &P,
    schedule: &ScheduleConfig,
    input: &AdjustmentInput,
) -> Result<AdjustmentTrace, RatingError> {
    if !Percent::in_range(input.wpi) {
        return Err(RatingError::invalid_input(format!(
            "wpi {} is outside the 0-100 scale",
            input.wpi
        )));
    }
    if input.pain_add_on < Decimal::ZERO {
        return Err(RatingError::invalid_input(format!(
            "pain add-on {} is negative",
            input.pain_add_on
        )));
    }

    // Step 1: the base rating is not re-capped at 100
    let effective_add_on = input.pain_add_on.min(schedule.pain_add_on_cap);
    let base_rating = input.wpi + effective_add_on;
    let adjusted_rating = base_rating * schedule.earning_capacity_factor;

    // Step 2
    let occupational = schedule
        .bucket_strategy
        .resolve(tables.occupational_adjustments(), adjusted_rating)
        .ok_or_else(|| RatingError::NoAdjustmentBucket {
            stage: RatingStage::OccupationalAdjustment,
            value: adjusted_rating.to_string(),
            reason: "occupational adjustment table is empty".to_string(),
        })?;
    let occupational_rating = occupational.rating_for(input.variant);
    ensure_in_range(RatingStage::OccupationalAdjustment, occupational_rating)?;

    // Step 3
    let age_bracket = AgeBracket::for_age(input.age_at_injury).ok_or_else(|| {
        RatingError::NoAdjustmentBucket {
            stage: RatingStage::AgeAdjustment,
            value: input.age_at_injury.to_string(),
            reason: "age at injury is negative".to_string(),
        }
    })?;
    let age_row = schedule
        .bucket_strategy
        .resolve(tables.age_adjustments(), occupational_rating)
        .ok_or_else(|| RatingError::NoAdjustmentBucket {
            stage: RatingStage::AgeAdjustment,
            value: occupational_rating.to_string(),
            reason: "age adjustment table is empty".to_string(),
        })?;
    let final_value = age_row.rating_for(age_bracket);
    let final_rating = ensure_in_range(RatingStage::AgeAdjustment, final_value)?;

    debug!(
        wpi = %input.wpi,
        %effective_add_on,
        %adjusted_rating,
        occupational_bucket = %occupational.rating_percent,
        %occupational_rating,
        age_bracket = %age_bracket,
        age_bucket = %age_row.wpi_percent,
        final_rating = %final_rating,
        "Impairment adjusted"
    );

    Ok(AdjustmentTrace {
        effective_add_on,
        base_rating,
        adjusted_rating,
        occupational_bucket: occupational.rating_percent,
        occupational_rating,
        age_bracket,
        age_bucket: age_row.wpi_percent,
        final_rating,
    })
}

fn ensure_in_range(stage: RatingStage, value: Decimal) -> Result<Percent, RatingError> {
    Percent::new(value).map_err(|_| RatingError::RatingOutOfRange { stage, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::BucketStrategy;
    use crate::tables::{
        AgeAdjustmentRecord, OccupationalAdjustmentRecord, ReferenceTables, VariantTable,
        VariantTables,
    };
    use rust_decimal_macros::dec;

    /// Occupational rows at 0,5,..,50 with column value = key + letter offset;
    /// age rows at 0,1,..,50 with column value = key + bracket offset
    fn tables() -> ReferenceTables {
        let letter_offsets = [-4, -3, -2, 0, 2, 4, 6, 8];
        let age_offsets = [-2, -2, -1, -1, 0, 1, 1, 2, 2, 3];

        let occupational = (0..=10)
            .map(|i| {
                let key = Decimal::from(i * 5);
                let ratings = letter_offsets.map(|o| (key + Decimal::from(o)).max(Decimal::ZERO));
                OccupationalAdjustmentRecord::new(key, ratings)
            })
            .collect();
        let age = (0..=50)
            .map(|i| {
                let key = Decimal::from(i);
                let ratings = age_offsets.map(|o| (key + Decimal::from(o)).max(Decimal::ZERO));
                AgeAdjustmentRecord::new(key, ratings)
            })
            .collect();

        let variants =
            VariantTables::new(310, VariantTable::empty(), VariantTable::empty()).unwrap();
        ReferenceTables::new(vec![], variants, occupational, age).unwrap()
    }

    fn input(wpi: Decimal, pain: Decimal, age: i32) -> AdjustmentInput {
        AdjustmentInput {
            wpi,
            pain_add_on: pain,
            group_number: 360,
            variant: VariantLetter::G,
            age_at_injury: age,
        }
    }

    #[test]
    fn test_pain_add_on_capped() {
        let trace = adjust(&tables(), &ScheduleConfig::default(), &input(dec!(20), dec!(5), 45)).unwrap();
        assert_eq!(trace.effective_add_on, dec!(3));
        assert_eq!(trace.base_rating, dec!(23));
        assert_eq!(trace.adjusted_rating, dec!(23));
    }

    #[test]
    fn test_nearest_buckets_feed_each_stage() {
        // 23 -> bucket 25 -> G column 27 -> age bucket 27 -> 42-46 column 28
        let trace = adjust(&tables(), &ScheduleConfig::default(), &input(dec!(20), dec!(5), 45)).unwrap();
        assert_eq!(trace.occupational_bucket, dec!(25));
        assert_eq!(trace.occupational_rating, dec!(27));
        assert_eq!(trace.age_bracket, AgeBracket::From42To46);
        assert_eq!(trace.age_bucket, dec!(27));
        assert_eq!(trace.final_rating.value(), dec!(28));
    }

    #[test]
    fn test_tie_resolves_to_lower_bucket() {
        // 22.5 is equidistant from 20 and 25
        let trace = adjust(&tables(), &ScheduleConfig::default(), &input(dec!(22.5), dec!(0), 40)).unwrap();
        assert_eq!(trace.occupational_bucket, dec!(20));
    }

    #[test]
    fn test_floor_strategy() {
        let schedule = ScheduleConfig::default().with_bucket_strategy(BucketStrategy::Floor);
        let trace = adjust(&tables(), &schedule, &input(dec!(24), dec!(0), 40)).unwrap();
        assert_eq!(trace.occupational_bucket, dec!(20));
    }

    #[test]
    fn test_earning_capacity_factor() {
        let schedule = ScheduleConfig::default().with_earning_capacity_factor(dec!(1.4));
        let trace = adjust(&tables(), &schedule, &input(dec!(10), dec!(0), 40)).unwrap();
        assert_eq!(trace.adjusted_rating, dec!(14.0));
        assert_eq!(trace.occupational_bucket, dec!(15));
    }

    #[test]
    fn test_negative_age_has_no_bucket() {
        let err = adjust(&tables(), &ScheduleConfig::default(), &input(dec!(10), dec!(0), -1)).unwrap_err();
        assert_eq!(err.stage(), RatingStage::AgeAdjustment);
        assert!(matches!(err, RatingError::NoAdjustmentBucket { .. }));
    }

    #[test]
    fn test_empty_table_has_no_bucket() {
        let variants =
            VariantTables::new(310, VariantTable::empty(), VariantTable::empty()).unwrap();
        let empty = ReferenceTables::new(vec![], variants, vec![], vec![]).unwrap();
        let err = adjust(&empty, &ScheduleConfig::default(), &input(dec!(10), dec!(0), 30)).unwrap_err();
        assert_eq!(err.stage(), RatingStage::OccupationalAdjustment);
    }

    #[test]
    fn test_invalid_inputs() {
        let schedule = ScheduleConfig::default();
        assert!(matches!(
            adjust(&tables(), &schedule, &input(dec!(101), dec!(0), 30)),
            Err(RatingError::InvalidInput(_))
        ));
        assert!(matches!(
            adjust(&tables(), &schedule, &input(dec!(10), dec!(-1), 30)),
            Err(RatingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_table_value_out_of_range() {
        let occupational = vec![OccupationalAdjustmentRecord::new(dec!(0), [dec!(120); 8])];
        let age = vec![AgeAdjustmentRecord::new(dec!(0), [dec!(0); 10])];
        let variants =
            VariantTables::new(310, VariantTable::empty(), VariantTable::empty()).unwrap();
        let tables = ReferenceTables::new(vec![], variants, occupational, age).unwrap();

        let err = adjust(&tables, &ScheduleConfig::default(), &input(dec!(10), dec!(0), 30)).unwrap_err();
        assert_eq!(
            err,
            RatingError::RatingOutOfRange {
                stage: RatingStage::OccupationalAdjustment,
                value: dec!(120)
            }
        );
    }

    #[test]
    fn test_adjust_is_pure() {
        let tables = tables();
        let schedule = ScheduleConfig::default();
        let input = input(dec!(17), dec!(2), 58);
        assert_eq!(adjust(&tables, &schedule, &input), adjust(&tables, &schedule, &input));
    }
}
