//! Rating inputs: impairment findings and claimant context

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::Percent;
use crate::error::RatingError;

/// Body region used to group impairments before combining
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    Spine,
    UpperExtremity,
    LowerExtremity,
    Other,
}

impl BodyRegion {
    pub const ALL: [BodyRegion; 4] = [
        BodyRegion::Spine,
        BodyRegion::UpperExtremity,
        BodyRegion::LowerExtremity,
        BodyRegion::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyRegion::Spine => "spine",
            BodyRegion::UpperExtremity => "upper_extremity",
            BodyRegion::LowerExtremity => "lower_extremity",
            BodyRegion::Other => "other",
        }
    }
}

impl fmt::Display for BodyRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single whole-person impairment finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpairmentFinding {
    /// Free-text body part, e.g. "lower back"
    pub body_part_description: String,
    /// Whole person impairment on the 0-100 scale
    pub wpi: Decimal,
    /// Pain add-on requested by the evaluator, capped during adjustment
    #[serde(default)]
    pub pain_add_on: Decimal,
    /// Share of the disability attributed to other causes
    #[serde(default)]
    pub apportionment_percent: Decimal,
}

impl ImpairmentFinding {
    pub fn new(body_part_description: impl Into<String>, wpi: Decimal) -> Self {
        Self {
            body_part_description: body_part_description.into(),
            wpi,
            pain_add_on: Decimal::ZERO,
            apportionment_percent: Decimal::ZERO,
        }
    }

    pub fn with_pain_add_on(mut self, pain_add_on: Decimal) -> Self {
        self.pain_add_on = pain_add_on;
        self
    }

    pub fn with_apportionment(mut self, apportionment_percent: Decimal) -> Self {
        self.apportionment_percent = apportionment_percent;
        self
    }

    /// Checks numeric ranges before the finding enters the pipeline
    pub fn validate(&self) -> Result<(), RatingError> {
        if self.body_part_description.trim().is_empty() {
            return Err(RatingError::invalid_input("body part description is empty"));
        }
        if !Percent::in_range(self.wpi) {
            return Err(RatingError::invalid_input(format!(
                "wpi {} is outside the 0-100 scale",
                self.wpi
            )));
        }
        if self.pain_add_on < Decimal::ZERO {
            return Err(RatingError::invalid_input(format!(
                "pain add-on {} is negative",
                self.pain_add_on
            )));
        }
        if !Percent::in_range(self.apportionment_percent) {
            return Err(RatingError::invalid_input(format!(
                "apportionment {} is outside the 0-100 scale",
                self.apportionment_percent
            )));
        }
        Ok(())
    }

    pub fn is_apportioned(&self) -> bool {
        self.apportionment_percent > Decimal::ZERO
    }
}

/// Claimant facts that drive the occupational and age adjustments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimantContext {
    pub occupation_title: String,
    pub age_at_injury: i32,
}

impl ClaimantContext {
    pub fn new(occupation_title: impl Into<String>, age_at_injury: i32) -> Self {
        Self {
            occupation_title: occupation_title.into(),
            age_at_injury,
        }
    }

    /// Builds the context from a date of birth and a date of injury
    ///
    /// Age is the number of completed years on the injury date.
    pub fn from_dates(
        occupation_title: impl Into<String>,
        date_of_birth: NaiveDate,
        date_of_injury: NaiveDate,
    ) -> Result<Self, RatingError> {
        if date_of_injury < date_of_birth {
            return Err(RatingError::invalid_input(format!(
                "date of injury {} precedes date of birth {}",
                date_of_injury, date_of_birth
            )));
        }

        let mut age = date_of_injury.year() - date_of_birth.year();
        if (date_of_injury.month(), date_of_injury.day())
            < (date_of_birth.month(), date_of_birth.day())
        {
            age -= 1;
        }

        Ok(Self::new(occupation_title, age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_age_from_dates_counts_completed_years() {
        let dob = NaiveDate::from_ymd_opt(1980, 6, 15).unwrap();

        let before_birthday = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let ctx = ClaimantContext::from_dates("Packer", dob, before_birthday).unwrap();
        assert_eq!(ctx.age_at_injury, 44);

        let on_birthday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let ctx = ClaimantContext::from_dates("Packer", dob, on_birthday).unwrap();
        assert_eq!(ctx.age_at_injury, 45);
    }

    #[test]
    fn test_injury_before_birth_rejected() {
        let dob = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let doi = NaiveDate::from_ymd_opt(1989, 12, 31).unwrap();
        assert!(matches!(
            ClaimantContext::from_dates("Packer", dob, doi),
            Err(RatingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_finding_validation() {
        assert!(ImpairmentFinding::new("knee", dec!(12)).validate().is_ok());
        assert!(ImpairmentFinding::new("knee", dec!(100.5)).validate().is_err());
        assert!(ImpairmentFinding::new("knee", dec!(5))
            .with_pain_add_on(dec!(-1))
            .validate()
            .is_err());
        assert!(ImpairmentFinding::new("  ", dec!(5)).validate().is_err());
    }

    #[test]
    fn test_finding_defaults_from_json() {
        let finding: ImpairmentFinding =
            serde_json::from_str(r#"{"body_part_description":"wrist","wpi":"7"}"#).unwrap();
        assert_eq!(finding.pain_add_on, Decimal::ZERO);
        assert!(!finding.is_apportioned());
    }
}
