//! Rating domain errors

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline stage at which a rating failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingStage {
    /// Request validation before any lookup
    Input,
    /// Occupation or body-part classification
    Classification,
    /// Variant letter lookup
    VariantResolution,
    /// Occupational adjustment table
    OccupationalAdjustment,
    /// Age adjustment table
    AgeAdjustment,
    /// Combined values
    Combination,
    /// Weeks and payout
    Payout,
}

impl RatingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingStage::Input => "input",
            RatingStage::Classification => "classification",
            RatingStage::VariantResolution => "variant_resolution",
            RatingStage::OccupationalAdjustment => "occupational_adjustment",
            RatingStage::AgeAdjustment => "age_adjustment",
            RatingStage::Combination => "combination",
            RatingStage::Payout => "payout",
        }
    }
}

impl fmt::Display for RatingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a variant lookup came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantMiss {
    /// No row for the body part and impairment code
    RowMissing,
    /// The variant table has no column for the group
    GroupColumnMissing,
    /// The row exists but the group's cell is empty
    EmptyCell,
}

impl fmt::Display for VariantMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VariantMiss::RowMissing => "no row for body part and impairment code",
            VariantMiss::GroupColumnMissing => "no column for occupation group",
            VariantMiss::EmptyCell => "cell is empty",
        };
        f.write_str(text)
    }
}

/// Errors that abort a rating
///
/// All variants are terminal: the engine never substitutes a default value
/// for a failed lookup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RatingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No occupation group matches '{title}'")]
    UnclassifiedOccupation { title: String },

    #[error("No impairment code matches body part '{description}'")]
    UnclassifiedBodyPart { description: String },

    #[error(
        "No variant for group {group_number}, body part {body_part}, impairment {impairment_code}: {reason}"
    )]
    VariantNotFound {
        group_number: u16,
        body_part: String,
        impairment_code: String,
        reason: VariantMiss,
    },

    #[error("No {stage} bucket for {value}: {reason}")]
    NoAdjustmentBucket {
        stage: RatingStage,
        value: String,
        reason: String,
    },

    #[error("Rating {value} at {stage} is outside the 0-100 scale")]
    RatingOutOfRange { stage: RatingStage, value: Decimal },
}

impl RatingError {
    /// Returns the pipeline stage that produced the error
    pub fn stage(&self) -> RatingStage {
        match self {
            RatingError::InvalidInput(_) => RatingStage::Input,
            RatingError::UnclassifiedOccupation { .. } => RatingStage::Classification,
            RatingError::UnclassifiedBodyPart { .. } => RatingStage::Classification,
            RatingError::VariantNotFound { .. } => RatingStage::VariantResolution,
            RatingError::NoAdjustmentBucket { stage, .. } => *stage,
            RatingError::RatingOutOfRange { stage, .. } => *stage,
        }
    }

    /// Returns a stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            RatingError::InvalidInput(_) => "INVALID_INPUT",
            RatingError::UnclassifiedOccupation { .. } => "UNCLASSIFIED_OCCUPATION",
            RatingError::UnclassifiedBodyPart { .. } => "UNCLASSIFIED_BODY_PART",
            RatingError::VariantNotFound { .. } => "VARIANT_NOT_FOUND",
            RatingError::NoAdjustmentBucket { .. } => "NO_ADJUSTMENT_BUCKET",
            RatingError::RatingOutOfRange { .. } => "RATING_OUT_OF_RANGE",
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        RatingError::InvalidInput(message.into())
    }
}

/// Errors raised while assembling a reference table snapshot
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableError {
    #[error("Duplicate bucket {key} in {table} table")]
    DuplicateBucket { table: &'static str, key: Decimal },

    #[error("Duplicate variant row ({body_part}, {impairment_code})")]
    DuplicateVariantRow {
        body_part: String,
        impairment_code: String,
    },

    #[error("Variant row ({body_part}) references group {group_number} which has no column")]
    UnknownVariantGroup { group_number: u16, body_part: String },

    #[error("Group {group_number} is on the wrong side of the variant split at {split_group}")]
    GroupOnWrongSide { group_number: u16, split_group: u16 },

    #[error("Invalid variant letter '{0}', expected one of c..j")]
    InvalidVariantLetter(String),

    #[error("Invalid payout bracket: {0}")]
    InvalidBracket(String),

    #[error("Invalid medical cost: {0}")]
    InvalidMedicalCost(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stage_reported_for_each_kind() {
        let err = RatingError::UnclassifiedOccupation {
            title: "Astronaut".to_string(),
        };
        assert_eq!(err.stage(), RatingStage::Classification);

        let err = RatingError::NoAdjustmentBucket {
            stage: RatingStage::AgeAdjustment,
            value: "-3".to_string(),
            reason: "negative age".to_string(),
        };
        assert_eq!(err.stage(), RatingStage::AgeAdjustment);

        let err = RatingError::RatingOutOfRange {
            stage: RatingStage::Payout,
            value: dec!(101),
        };
        assert_eq!(err.stage(), RatingStage::Payout);
        assert_eq!(err.code(), "RATING_OUT_OF_RANGE");
    }

    #[test]
    fn test_messages_carry_offending_value() {
        let err = RatingError::VariantNotFound {
            group_number: 360,
            body_part: "SPINE".to_string(),
            impairment_code: "15.03.02.05".to_string(),
            reason: VariantMiss::EmptyCell,
        };
        let message = err.to_string();
        assert!(message.contains("360"));
        assert!(message.contains("15.03.02.05"));
        assert!(message.contains("cell is empty"));
    }
}
