//! Variant letter resolution

use tracing::debug;

use crate::error::{RatingError, VariantMiss};
use crate::ports::LookupProvider;
use crate::tables::VariantLetter;

/// Looks up the occupational variant letter for a group and impairment
///
/// A missing row, a missing group column and an empty cell are all hard
/// errors; no default letter is ever substituted.
pub fn resolve_variant<P: LookupProvider + ?Sized>(
    tables: &P,
    group_number: u16,
    body_part: &str,
    impairment_code: &str,
) -> Result<VariantLetter, RatingError> {
    let not_found = |reason| RatingError::VariantNotFound {
        group_number,
        body_part: body_part.to_string(),
        impairment_code: impairment_code.to_string(),
        reason,
    };

    if !tables.has_variant_column(group_number) {
        return Err(not_found(VariantMiss::GroupColumnMissing));
    }

    let row = tables
        .variant_row(group_number, body_part, impairment_code)
        .ok_or_else(|| not_found(VariantMiss::RowMissing))?;

    let letter = row
        .letter_for(group_number)
        .ok_or_else(|| not_found(VariantMiss::EmptyCell))?;

    debug!(
        group_number,
        body_part,
        impairment_code,
        variant = %letter,
        "Variant resolved"
    );
    Ok(letter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{ReferenceTables, VariantRecord, VariantTable, VariantTables};

    fn tables() -> ReferenceTables {
        let low = VariantTable::new(
            [110, 214],
            vec![VariantRecord::new("SPINE", "15.03.02.05").with_letter(214, VariantLetter::C)],
        )
        .unwrap();
        let high = VariantTable::new(
            [360, 380],
            vec![
                VariantRecord::new("SPINE", "15.03.02.05")
                    .with_letter(360, VariantLetter::G)
                    .with_letter(380, VariantLetter::H),
                VariantRecord::new("KNEE", "17.05.00.00").with_letter(380, VariantLetter::F),
            ],
        )
        .unwrap();
        let variants = VariantTables::new(310, low, high).unwrap();
        ReferenceTables::new(vec![], variants, vec![], vec![]).unwrap()
    }

    #[test]
    fn test_low_and_high_tables_selected_by_group() {
        let tables = tables();
        assert_eq!(
            resolve_variant(&tables, 214, "SPINE", "15.03.02.05").unwrap(),
            VariantLetter::C
        );
        assert_eq!(
            resolve_variant(&tables, 360, "spine", "15.03.02.05").unwrap(),
            VariantLetter::G
        );
    }

    #[test]
    fn test_empty_cell_is_an_error() {
        let err = resolve_variant(&tables(), 360, "KNEE", "17.05.00.00").unwrap_err();
        assert!(matches!(
            err,
            RatingError::VariantNotFound {
                reason: VariantMiss::EmptyCell,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_row_or_cell_is_an_error() {
        let err = resolve_variant(&tables(), 110, "SPINE", "15.03.02.05").unwrap_err();
        assert!(matches!(
            err,
            RatingError::VariantNotFound {
                reason: VariantMiss::EmptyCell,
                ..
            }
        ));

        let err = resolve_variant(&tables(), 360, "HIP", "17.03.00.00").unwrap_err();
        assert!(matches!(
            err,
            RatingError::VariantNotFound {
                reason: VariantMiss::RowMissing,
                ..
            }
        ));
    }

    #[test]
    fn test_group_without_column() {
        let err = resolve_variant(&tables(), 590, "SPINE", "15.03.02.05").unwrap_err();
        assert!(matches!(
            err,
            RatingError::VariantNotFound {
                group_number: 590,
                reason: VariantMiss::GroupColumnMissing,
                ..
            }
        ));
    }
}
