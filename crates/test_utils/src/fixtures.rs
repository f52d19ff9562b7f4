//! Pre-built Test Fixtures
//!
//! The fixture schedule is small but shaped like the real one:
//!
//! - occupational table: whole-percent buckets 0..=100, each letter column is
//!   the bucket plus a fixed offset (c -4, d -3, e -2, f 0, g +2, h +4, i +6,
//!   j +8), clamped to 0..=100
//! - age table: whole-percent buckets 0..=100, each bracket column is the
//!   bucket plus an offset (-2, -2, -1, -1, 0, +1, +1, +2, +2, +3), clamped
//!
//! so expected ratings can be worked out by hand.

use std::sync::Arc;

use core_kernel::{Currency, Money};
use domain_rating::{
    AgeAdjustmentRecord, ClaimantContext, ImpairmentFinding, OccupationRecord,
    OccupationalAdjustmentRecord, RatingEngine, RatingRequest, ReferenceTables, VariantLetter,
    VariantRecord, VariantTable, VariantTables,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Offsets of letter columns c..j
pub const LETTER_OFFSETS: [i64; 8] = [-4, -3, -2, 0, 2, 4, 6, 8];

/// Offsets of the ten age bracket columns
pub const AGE_OFFSETS: [i64; 10] = [-2, -2, -1, -1, 0, 1, 1, 2, 2, 3];

pub const LOW_GROUPS: [u16; 2] = [111, 214];
pub const HIGH_GROUPS: [u16; 4] = [311, 360, 380, 470];

/// Group with an occupation row but no variant column
pub const GROUP_WITHOUT_VARIANTS: u16 = 590;

static REFERENCE_TABLES: Lazy<Arc<ReferenceTables>> = Lazy::new(|| {
    Arc::new(TableFixtures::reference_tables())
});

fn clamp_percent(value: i64) -> Decimal {
    Decimal::from(value.clamp(0, 100))
}

/// Fixture for reference tables
pub struct TableFixtures;

impl TableFixtures {
    /// Shared fixture snapshot
    pub fn shared() -> Arc<ReferenceTables> {
        Arc::clone(&REFERENCE_TABLES)
    }

    /// A freshly built fixture snapshot with its own id
    pub fn reference_tables() -> ReferenceTables {
        Self::build(Self::occupational_adjustments())
            .unwrap_or_else(|e| panic!("fixture tables are invalid: {}", e))
    }

    /// Fixture snapshot whose occupational columns all sit `shift` points
    /// higher (clamped), so the same request rates differently
    pub fn shifted_tables(shift: i64) -> ReferenceTables {
        Self::build(Self::shifted_occupational_adjustments(shift))
            .unwrap_or_else(|e| panic!("shifted fixture tables are invalid: {}", e))
    }

    pub fn occupations() -> Vec<OccupationRecord> {
        vec![
            OccupationRecord::new(360, "Packer", "Manufacturing"),
            OccupationRecord::new(214, "Clerk, General Office", "Clerical"),
            OccupationRecord::new(470, "Truck Driver, Heavy", "Transportation"),
            OccupationRecord::new(380, "Carpenter", "Construction"),
            OccupationRecord::new(111, "Software Engineer", "Professional"),
            OccupationRecord::new(311, "Registered Nurse", "Healthcare"),
            OccupationRecord::new(GROUP_WITHOUT_VARIANTS, "Stunt Performer", "Entertainment"),
        ]
    }

    /// Variant rows as `(body_part, impairment_code, letters per group)`;
    /// `None` leaves the cell empty
    pub fn variant_rows() -> Vec<(&'static str, &'static str, [(u16, Option<VariantLetter>); 6])> {
        use VariantLetter::*;

        let standard = |g: VariantLetter| {
            [
                (111, Some(C)),
                (214, Some(D)),
                (311, Some(E)),
                (360, Some(g)),
                (380, Some(H)),
                (470, Some(F)),
            ]
        };

        vec![
            ("SPINE", "15.01.02.05", standard(G)),
            ("SPINE", "15.03.02.05", standard(G)),
            ("SHOULDER", "16.02.01.00", standard(F)),
            ("ELBOW", "16.03.01.00", standard(F)),
            ("WRIST", "16.04.01.00", standard(E)),
            ("HAND", "16.05.00.00", standard(E)),
            ("ARM", "16.01.04.00", standard(F)),
            ("ARM", "16.00.00.00", standard(F)),
            ("KNEE", "17.05.05.00", standard(H)),
            ("KNEE", "17.05.00.00", standard(H)),
            ("ANKLE", "17.07.00.00", standard(G)),
            ("HIP", "17.03.00.00", standard(G)),
            ("LEG", "17.01.02.00", standard(I)),
            ("LEG", "17.00.00.00", standard(G)),
            ("MASTICATION", "11.03.02.00", standard(C)),
            (
                "PSYCHE",
                "14.01.00.00",
                [
                    (111, Some(C)),
                    (214, Some(C)),
                    (311, Some(D)),
                    (360, Some(E)),
                    (380, Some(E)),
                    (470, None),
                ],
            ),
        ]
    }

    fn variant_tables() -> Result<VariantTables, domain_rating::TableError> {
        let mut low_rows = Vec::new();
        let mut high_rows = Vec::new();

        for (body_part, code, letters) in Self::variant_rows() {
            let mut low = VariantRecord::new(body_part, code);
            let mut high = VariantRecord::new(body_part, code);
            for (group, letter) in letters {
                let Some(letter) = letter else { continue };
                if LOW_GROUPS.contains(&group) {
                    low = low.with_letter(group, letter);
                } else {
                    high = high.with_letter(group, letter);
                }
            }
            low_rows.push(low);
            high_rows.push(high);
        }

        VariantTables::new(
            VariantTables::REFERENCE_SPLIT,
            VariantTable::new(LOW_GROUPS, low_rows)?,
            VariantTable::new(HIGH_GROUPS, high_rows)?,
        )
    }

    pub fn occupational_adjustments() -> Vec<OccupationalAdjustmentRecord> {
        Self::shifted_occupational_adjustments(0)
    }

    fn shifted_occupational_adjustments(shift: i64) -> Vec<OccupationalAdjustmentRecord> {
        (0..=100i64)
            .map(|key| {
                OccupationalAdjustmentRecord::new(
                    Decimal::from(key),
                    LETTER_OFFSETS.map(|offset| clamp_percent(key + offset + shift)),
                )
            })
            .collect()
    }

    pub fn age_adjustments() -> Vec<AgeAdjustmentRecord> {
        (0..=100i64)
            .map(|key| {
                AgeAdjustmentRecord::new(
                    Decimal::from(key),
                    AGE_OFFSETS.map(|offset| clamp_percent(key + offset)),
                )
            })
            .collect()
    }

    fn build(
        occupational: Vec<OccupationalAdjustmentRecord>,
    ) -> Result<ReferenceTables, domain_rating::TableError> {
        ReferenceTables::new(
            Self::occupations(),
            Self::variant_tables()?,
            occupational,
            Self::age_adjustments(),
        )
    }
}

/// Fixture for engine and money values
pub struct EngineFixtures;

impl EngineFixtures {
    /// Reference weekly rate, $290.00
    pub fn weekly_rate() -> Money {
        Money::new(dec!(290.00), Currency::USD)
    }

    pub fn engine() -> RatingEngine {
        RatingEngine::reference(Self::weekly_rate())
    }
}

/// Requests with outcomes worked out by hand against the fixture tables
pub struct RequestFixtures;

impl RequestFixtures {
    /// Packer, 45, lower back WPI 20 with pain add-on 5
    ///
    /// 20 + min(5, 3) = 23 -> G column 25 -> age 42-46 column 26 ->
    /// 26% x 6 weeks = 156 weeks -> $45,240.00
    pub fn packer_lower_back() -> RatingRequest {
        RatingRequest::new(
            ClaimantContext::new("Packer", 45),
            vec![ImpairmentFinding::new("lower back", dec!(20)).with_pain_add_on(dec!(5))],
        )
    }

    /// Packer, 40, lower back WPI 28 and shoulder WPI 20
    ///
    /// Spine 28 -> G 30 -> 30; shoulder 20 -> F 20 -> 20;
    /// 30 C 20 = 44 -> 44% x 7 weeks = 308 weeks -> $89,320.00
    pub fn packer_two_regions() -> RatingRequest {
        RatingRequest::new(
            ClaimantContext::new("Packer", 40),
            vec![
                ImpairmentFinding::new("lower back", dec!(28)),
                ImpairmentFinding::new("left shoulder", dec!(20)),
            ],
        )
    }

    /// JSON body of [`RequestFixtures::packer_lower_back`] as the HTTP API expects it
    pub fn packer_lower_back_json() -> serde_json::Value {
        serde_json::json!({
            "occupation_title": "Packer",
            "age_at_injury": 45,
            "findings": [
                {
                    "body_part_description": "lower back",
                    "wpi": "20",
                    "pain_add_on": "5"
                }
            ]
        })
    }
}
