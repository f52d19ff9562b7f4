//! End-to-end tests for domain_rating against the fixture schedule

use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_rating::{
    combine_pair, AgeBracket, BodyRegion, BucketStrategy, ClassificationRules, ImpairmentFinding,
    LookupProvider, MedicalCostTable, OccupationMatch, PayoutSchedule, RatingEngine, RatingError, RatingStage,
    ScheduleConfig, TableStore, VariantLetter, VariantMiss,
};
use test_utils::{
    assert_money_approx_eq, assert_percent_eq, assert_result_consistent, request_strategy,
    EngineFixtures, RatingRequestBuilder, RequestFixtures, TableFixtures, GROUP_WITHOUT_VARIANTS,
};

// ============================================================================
// Lookup Provider Tests
// ============================================================================

mod lookup_tests {
    use super::*;

    #[test]
    fn test_split_is_hidden_behind_provider() {
        let tables = TableFixtures::shared();

        let low = tables.variant_row(214, "SPINE", "15.03.02.05").unwrap();
        assert_eq!(low.letter_for(214), Some(VariantLetter::D));
        assert_eq!(low.letter_for(360), None);

        let high = tables.variant_row(360, "SPINE", "15.03.02.05").unwrap();
        assert_eq!(high.letter_for(360), Some(VariantLetter::G));
    }

    #[test]
    fn test_bucketed_tables_are_sorted() {
        let tables = TableFixtures::shared();
        let keys: Vec<_> = tables.age_adjustments().iter().map(|r| r.wpi_percent).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fixture_tables_are_complete() {
        assert!(TableFixtures::shared().is_complete());
        assert_eq!(TableFixtures::shared().summary().split_group, 310);
    }
}

// ============================================================================
// Engine Tests
// ============================================================================

mod engine_tests {
    use super::*;

    #[test]
    fn test_packer_lower_back_reference_example() {
        let engine = EngineFixtures::engine();
        let result = engine
            .rate(&*TableFixtures::shared(), &RequestFixtures::packer_lower_back())
            .unwrap();

        assert_eq!(result.group_number, 360);
        assert_eq!(
            result.occupation_match,
            OccupationMatch::Exact {
                title: "Packer".to_string()
            }
        );

        let trace = &result.impairments[0];
        assert_eq!(trace.impairment_code, "15.03.02.05");
        assert_eq!(trace.body_region, BodyRegion::Spine);
        assert_eq!(trace.variant, VariantLetter::G);
        assert_eq!(trace.adjustment.effective_add_on, dec!(3));
        assert_eq!(trace.adjustment.base_rating, dec!(23));
        assert_eq!(trace.adjustment.occupational_rating, dec!(25));
        assert_eq!(trace.adjustment.age_bracket, AgeBracket::From42To46);
        assert_percent_eq(trace.adjustment.final_rating, dec!(26));
        assert_eq!(trace.rating_string, "15.03.02.05 - 20 - [1.0]23 - 360G - 26%");

        assert_percent_eq(result.combined_percent(), dec!(26));
        assert_eq!(result.weeks(), dec!(156));
        assert_eq!(result.total_payout().amount(), dec!(45240.00));
        assert!(result.apportioned.is_none());
        assert!(result.life_pension().is_none());
        assert_result_consistent(&result);
    }

    #[test]
    fn test_future_medical_for_rated_body_parts() {
        let engine = EngineFixtures::engine();
        let tables = TableFixtures::shared();

        // Spine 5000 x 1.20 = 6000 a year, 10 years at 3%
        let single = engine.rate(&*tables, &RequestFixtures::packer_lower_back()).unwrap();
        assert_eq!(single.future_medical.items[0].variant_body_part, "SPINE");
        assert_eq!(single.future_medical.total_annual_cost.amount(), dec!(6000));
        assert_eq!(single.projected_medical_cost().amount(), dec!(68783));

        // Spine 5000 x 1.28 + shoulder 3000 x 1.20 = 10000 a year
        let two = engine.rate(&*tables, &RequestFixtures::packer_two_regions()).unwrap();
        assert_eq!(two.future_medical.items.len(), 2);
        assert_eq!(two.future_medical.items[1].annual_cost.amount(), dec!(3600));
        assert_eq!(two.future_medical.total_annual_cost.amount(), dec!(10000));
        assert_eq!(two.projected_medical_cost().amount(), dec!(114639));
        assert_result_consistent(&two);
    }

    #[test]
    fn test_future_medical_uses_configured_costs_and_inflation() {
        let flat = MedicalCostTable::new(Money::new(dec!(1000), Currency::USD)).unwrap();
        let engine = RatingEngine::new(
            ClassificationRules::reference(),
            ScheduleConfig::default().with_medical_inflation_rate(dec!(0)),
            PayoutSchedule::reference(EngineFixtures::weekly_rate()),
        )
        .with_medical_costs(flat);

        let result = engine
            .rate(&*TableFixtures::shared(), &RequestFixtures::packer_lower_back())
            .unwrap();
        assert_eq!(result.future_medical.total_annual_cost.amount(), dec!(1200));
        assert_eq!(result.projected_medical_cost().amount(), dec!(12000));
        assert_eq!(result.future_medical.years, 10);
        assert_percent_eq(result.combined_percent(), dec!(26));
    }

    #[test]
    fn test_two_regions_combine() {
        let engine = EngineFixtures::engine();
        let result = engine
            .rate(&*TableFixtures::shared(), &RequestFixtures::packer_two_regions())
            .unwrap();

        let finals: Vec<_> = result
            .impairments
            .iter()
            .map(|i| i.adjustment.final_rating.value())
            .collect();
        assert_eq!(finals, vec![dec!(30), dec!(20)]);

        assert_eq!(result.outcome.combination.regions.len(), 2);
        assert_eq!(result.outcome.combination.steps[0].to_string(), "30 C 20 = 44");
        assert_percent_eq(result.combined_percent(), dec!(44));
        assert_eq!(result.weeks(), dec!(308));
        assert_money_approx_eq(
            &result.total_payout(),
            &Money::new(dec!(89320.00), Currency::USD),
            dec!(0),
        );
    }

    #[test]
    fn test_single_small_impairment_passes_through() {
        // Software engineer, letter C: 14 -> 10; age 37-41 offset 0 -> 10
        let request = RatingRequestBuilder::new()
            .occupation("Software Engineer")
            .age(38)
            .finding("lower back", dec!(14))
            .build();

        let result = EngineFixtures::engine()
            .rate(&*TableFixtures::shared(), &request)
            .unwrap();

        assert_percent_eq(result.impairments[0].adjustment.final_rating, dec!(10));
        assert_percent_eq(result.combined_percent(), dec!(10));
        assert_eq!(result.weeks(), dec!(50));
    }

    #[test]
    fn test_same_region_combines_before_across() {
        // Spine 30 and 20 -> 44; knee (H) 10 -> 14; 44 C 14 = 51.84 -> 52
        let request = RatingRequestBuilder::new()
            .finding("lower back", dec!(28))
            .finding("neck", dec!(18))
            .finding("left knee", dec!(10))
            .build();

        let result = EngineFixtures::engine()
            .rate(&*TableFixtures::shared(), &request)
            .unwrap();

        let spine = &result.outcome.combination.regions[0];
        assert_eq!(spine.region, BodyRegion::Spine);
        assert_eq!(spine.value, dec!(44));
        assert_eq!(result.outcome.combination.unrounded, dec!(51.84));
        assert_percent_eq(result.combined_percent(), dec!(52));
        assert_result_consistent(&result);
    }

    #[test]
    fn test_apportioned_outcome() {
        let request = RatingRequestBuilder::new()
            .age(45)
            .with_finding(
                ImpairmentFinding::new("lower back", dec!(20))
                    .with_pain_add_on(dec!(5))
                    .with_apportionment(dec!(50)),
            )
            .build();

        let result = EngineFixtures::engine()
            .rate(&*TableFixtures::shared(), &request)
            .unwrap();

        assert_percent_eq(result.combined_percent(), dec!(26));
        let apportioned = result.apportioned.as_ref().unwrap();
        assert_percent_eq(apportioned.combination.combined_percent, dec!(13));
        assert_eq!(apportioned.payout.weeks, dec!(65));
        assert_percent_eq(result.impairments[0].apportioned_rating.unwrap(), dec!(13));
        assert_result_consistent(&result);
    }

    #[test]
    fn test_life_pension_flagged() {
        let request = RatingRequestBuilder::new()
            .finding("lower back", dec!(68))
            .build();

        let result = EngineFixtures::engine()
            .rate(&*TableFixtures::shared(), &request)
            .unwrap();

        assert_percent_eq(result.combined_percent(), dec!(70));
        let terms = result.life_pension().unwrap();
        assert_eq!(terms.weekly_rate.amount(), dec!(85.00));
    }

    #[test]
    fn test_occupation_override_and_group_code() {
        let engine = EngineFixtures::engine();
        let tables = TableFixtures::shared();

        let stocker = RatingRequestBuilder::new()
            .occupation("Warehouse Stocker")
            .finding("lower back", dec!(10))
            .build();
        assert_eq!(engine.rate(&*tables, &stocker).unwrap().group_number, 360);

        let coded = RatingRequestBuilder::new()
            .occupation("380H")
            .finding("lower back", dec!(10))
            .build();
        let result = engine.rate(&*tables, &coded).unwrap();
        assert_eq!(result.group_number, 380);
        assert_eq!(result.impairments[0].variant, VariantLetter::H);
    }

    #[test]
    fn test_earning_capacity_factor_and_floor_strategy() {
        let engine = RatingEngine::new(
            ClassificationRules::reference(),
            ScheduleConfig::default()
                .with_earning_capacity_factor(dec!(1.4))
                .with_bucket_strategy(BucketStrategy::Floor),
            PayoutSchedule::reference(EngineFixtures::weekly_rate()),
        );
        let request = RatingRequestBuilder::new()
            .finding("lower back", dec!(10))
            .build();

        let result = engine.rate(&*TableFixtures::shared(), &request).unwrap();
        let trace = &result.impairments[0];
        assert_eq!(trace.adjustment.adjusted_rating, dec!(14.0));
        assert_eq!(trace.adjustment.occupational_rating, dec!(16));
        assert_eq!(trace.rating_string, "15.03.02.05 - 10 - [1.4]14 - 360G - 16%");
    }

    #[test]
    fn test_rating_string_shows_full_factor() {
        let engine = RatingEngine::new(
            ClassificationRules::reference(),
            ScheduleConfig::default().with_earning_capacity_factor(dec!(1.45)),
            PayoutSchedule::reference(EngineFixtures::weekly_rate()),
        );
        let request = RatingRequestBuilder::new()
            .finding("lower back", dec!(10))
            .build();

        // 10 x 1.45 = 14.5 -> nearest bucket ties to 14 -> G column 16
        let result = engine.rate(&*TableFixtures::shared(), &request).unwrap();
        assert_eq!(
            result.impairments[0].rating_string,
            "15.03.02.05 - 10 - [1.45]14.5 - 360G - 16%"
        );
    }

    #[test]
    fn test_rating_is_pure() {
        let engine = EngineFixtures::engine();
        let tables = TableFixtures::shared();
        let request = RequestFixtures::packer_two_regions();

        let first = engine.rate(&*tables, &request).unwrap();
        let second = engine.rate(&*tables, &request).unwrap();
        assert_eq!(first, second);
    }
}

// ============================================================================
// Error Tests
// ============================================================================

mod error_tests {
    use super::*;

    fn rate(request: &domain_rating::RatingRequest) -> Result<domain_rating::RatingResult, RatingError> {
        EngineFixtures::engine().rate(&*TableFixtures::shared(), request)
    }

    #[test]
    fn test_empty_request_rejected() {
        let err = rate(&RatingRequestBuilder::new().build()).unwrap_err();
        assert_eq!(err.stage(), RatingStage::Input);
    }

    #[test]
    fn test_unknown_occupation() {
        let request = RatingRequestBuilder::new()
            .occupation("Astronaut")
            .finding("lower back", dec!(10))
            .build();
        assert!(matches!(
            rate(&request),
            Err(RatingError::UnclassifiedOccupation { .. })
        ));
    }

    #[test]
    fn test_unknown_body_part_fails_whole_request() {
        let request = RatingRequestBuilder::new()
            .finding("lower back", dec!(10))
            .finding("aura", dec!(5))
            .build();
        let err = rate(&request).unwrap_err();
        assert_eq!(
            err,
            RatingError::UnclassifiedBodyPart {
                description: "aura".to_string()
            }
        );
    }

    #[test]
    fn test_variant_misses() {
        let no_column = RatingRequestBuilder::new()
            .occupation("Stunt Performer")
            .finding("lower back", dec!(10))
            .build();
        assert!(matches!(
            rate(&no_column),
            Err(RatingError::VariantNotFound {
                group_number,
                reason: VariantMiss::GroupColumnMissing,
                ..
            }) if group_number == GROUP_WITHOUT_VARIANTS
        ));

        let empty_cell = RatingRequestBuilder::new()
            .occupation("Truck Driver, Heavy")
            .finding("anxiety", dec!(10))
            .build();
        assert!(matches!(
            rate(&empty_cell),
            Err(RatingError::VariantNotFound {
                reason: VariantMiss::EmptyCell,
                ..
            })
        ));

        let no_row = RatingRequestBuilder::new().finding("left eye", dec!(10)).build();
        assert!(matches!(
            rate(&no_row),
            Err(RatingError::VariantNotFound {
                reason: VariantMiss::RowMissing,
                ..
            })
        ));
    }

    #[test]
    fn test_negative_age() {
        let request = RatingRequestBuilder::new()
            .age(-2)
            .finding("lower back", dec!(10))
            .build();
        let err = rate(&request).unwrap_err();
        assert_eq!(err.stage(), RatingStage::AgeAdjustment);
    }

    #[test]
    fn test_wpi_out_of_range() {
        let request = RatingRequestBuilder::new()
            .finding("lower back", dec!(100.5))
            .build();
        assert!(matches!(rate(&request), Err(RatingError::InvalidInput(_))));
    }

    #[test]
    fn test_base_above_hundred_is_not_recapped() {
        // 99 + 3 = 102 resolves to the top bucket; G column clamps at 100
        let request = RatingRequestBuilder::new()
            .finding_with_pain("lower back", dec!(99), dec!(3))
            .build();
        let result = rate(&request).unwrap();
        assert_eq!(result.impairments[0].adjustment.base_rating, dec!(102));
        assert_percent_eq(result.combined_percent(), dec!(100));
        assert_eq!(result.weeks(), dec!(900));
    }
}

// ============================================================================
// Table Store Tests
// ============================================================================

mod store_tests {
    use super::*;

    #[test]
    fn test_rating_uses_snapshot_taken_at_start() {
        let engine = EngineFixtures::engine();
        let request = RequestFixtures::packer_lower_back();
        let store = TableStore::new(TableFixtures::reference_tables());
        let held = store.snapshot();

        let previous = store.replace(TableFixtures::shifted_tables(10));
        assert_eq!(previous.id(), held.id());

        // 23 -> G column 35 -> age column 36 under the new tables
        let current = store.snapshot();
        assert_ne!(held.id(), current.id());
        let old_result = engine.rate(&*held, &request).unwrap();
        let new_result = engine.rate(&*current, &request).unwrap();
        assert_percent_eq(old_result.combined_percent(), dec!(26));
        assert_percent_eq(new_result.combined_percent(), dec!(36));
    }

    #[test]
    fn test_replace_with_equal_content_still_changes_id() {
        let store = TableStore::new(TableFixtures::reference_tables());
        let before = store.snapshot().id();
        store.replace(TableFixtures::reference_tables());
        assert_ne!(before, store.snapshot().id());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ratable_requests_always_produce_consistent_results(request in request_strategy()) {
            let result = EngineFixtures::engine()
                .rate(&*TableFixtures::shared(), &request)
                .unwrap();
            assert_result_consistent(&result);
            prop_assert_eq!(result.impairments.len(), request.findings.len());
        }

        #[test]
        fn finding_order_does_not_change_the_rating(request in request_strategy()) {
            let mut reversed = request.clone();
            reversed.findings.reverse();

            let engine = EngineFixtures::engine();
            let tables = TableFixtures::shared();
            let forward = engine.rate(&*tables, &request).unwrap();
            let backward = engine.rate(&*tables, &reversed).unwrap();
            prop_assert_eq!(forward.combined_percent(), backward.combined_percent());
            prop_assert_eq!(forward.total_payout(), backward.total_payout());
        }

        #[test]
        fn combining_never_decreases(a in 0u32..=100, b in 0u32..=100) {
            let a = rust_decimal::Decimal::from(a);
            let b = rust_decimal::Decimal::from(b);
            prop_assert!(combine_pair(a, b) >= a.max(b));
        }
    }
}
