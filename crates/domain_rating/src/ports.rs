//! Lookup Provider port
//!
//! The pipeline stages read reference data only through this trait. The
//! two physical variant tables appear as a single logical table keyed by
//! group number; the split is an implementation detail of the provider.
//!
//! ```text
//! Classifier / Variant Resolver / Adjustment Pipeline
//!                     │
//!                     ▼
//!              LookupProvider
//!                     ▲
//!          ┌──────────┴──────────┐
//!   ReferenceTables         test doubles
//!  (loaded by infra_tables)
//! ```

use crate::tables::{
    AgeAdjustmentRecord, OccupationRecord, OccupationalAdjustmentRecord, ReferenceTables,
    VariantRecord,
};

/// Read-only access to the rating schedule's reference tables
///
/// Bucketed tables must be returned sorted ascending by key with no
/// duplicate keys.
pub trait LookupProvider {
    /// Occupation rows in table order
    fn occupations(&self) -> &[OccupationRecord];

    /// True when the variant table serving `group_number` has a column for it
    fn has_variant_column(&self, group_number: u16) -> bool;

    /// The variant row for a body part and impairment code, from the table
    /// serving `group_number`
    fn variant_row(
        &self,
        group_number: u16,
        body_part: &str,
        impairment_code: &str,
    ) -> Option<&VariantRecord>;

    fn occupational_adjustments(&self) -> &[OccupationalAdjustmentRecord];

    fn age_adjustments(&self) -> &[AgeAdjustmentRecord];
}

impl LookupProvider for ReferenceTables {
    fn occupations(&self) -> &[OccupationRecord] {
        ReferenceTables::occupations(self)
    }

    fn has_variant_column(&self, group_number: u16) -> bool {
        self.variants().table_for(group_number).has_group(group_number)
    }

    fn variant_row(
        &self,
        group_number: u16,
        body_part: &str,
        impairment_code: &str,
    ) -> Option<&VariantRecord> {
        self.variants()
            .table_for(group_number)
            .row(body_part, impairment_code)
    }

    fn occupational_adjustments(&self) -> &[OccupationalAdjustmentRecord] {
        self.occupational()
    }

    fn age_adjustments(&self) -> &[AgeAdjustmentRecord] {
        self.age()
    }
}
