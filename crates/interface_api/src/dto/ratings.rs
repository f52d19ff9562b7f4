//! Rating DTOs

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{RatingId, SnapshotId};
use domain_rating::{ClaimantContext, ImpairmentFinding, RatingRequest, RatingResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;

/// One physician finding
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct FindingRequest {
    #[validate(length(min = 1, max = 200))]
    pub body_part_description: String,
    pub wpi: Decimal,
    pub pain_add_on: Option<Decimal>,
    pub apportionment_percent: Option<Decimal>,
}

/// Claim to be rated
///
/// The age is either given directly or derived from the two dates.
#[derive(Debug, Deserialize, Validate)]
pub struct RateClaimRequest {
    #[validate(length(min = 1, max = 200))]
    pub occupation_title: String,
    pub age_at_injury: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_injury: Option<NaiveDate>,
    #[validate(length(min = 1), nested)]
    pub findings: Vec<FindingRequest>,
}

impl RateClaimRequest {
    pub fn into_rating_request(self) -> Result<RatingRequest, ApiError> {
        let claimant = match (self.age_at_injury, self.date_of_birth, self.date_of_injury) {
            (Some(age), _, _) => ClaimantContext::new(self.occupation_title, age),
            (None, Some(dob), Some(doi)) => ClaimantContext::from_dates(self.occupation_title, dob, doi)?,
            _ => {
                return Err(ApiError::BadRequest(
                    "either age_at_injury or both date_of_birth and date_of_injury are required"
                        .to_string(),
                ))
            }
        };

        let findings = self
            .findings
            .into_iter()
            .map(|f| {
                ImpairmentFinding::new(f.body_part_description, f.wpi)
                    .with_pain_add_on(f.pain_add_on.unwrap_or_default())
                    .with_apportionment(f.apportionment_percent.unwrap_or_default())
            })
            .collect();

        Ok(RatingRequest::new(claimant, findings))
    }
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub rating_id: RatingId,
    pub snapshot_id: SnapshotId,
    pub rated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: RatingResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(json: serde_json::Value) -> RateClaimRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_age_from_dates() {
        let rating = request(serde_json::json!({
            "occupation_title": "Packer",
            "date_of_birth": "1980-06-15",
            "date_of_injury": "2025-06-14",
            "findings": [{ "body_part_description": "lower back", "wpi": "20" }]
        }))
        .into_rating_request()
        .unwrap();

        assert_eq!(rating.claimant.age_at_injury, 44);
        assert_eq!(rating.findings[0].pain_add_on, Decimal::ZERO);
    }

    #[test]
    fn test_missing_age_rejected() {
        let result = request(serde_json::json!({
            "occupation_title": "Packer",
            "date_of_birth": "1980-06-15",
            "findings": [{ "body_part_description": "lower back", "wpi": "20" }]
        }))
        .into_rating_request();
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_validation() {
        let empty = request(serde_json::json!({
            "occupation_title": "",
            "age_at_injury": 40,
            "findings": []
        }));
        let errors = empty.validate().unwrap_err();
        assert!(errors.errors().contains_key("occupation_title"));
        assert!(errors.errors().contains_key("findings"));

        let valid = request(serde_json::json!({
            "occupation_title": "Packer",
            "age_at_injury": 40,
            "findings": [{ "body_part_description": "knee", "wpi": 12.5, "apportionment_percent": "50" }]
        }));
        assert!(valid.validate().is_ok());
        let rating = valid.into_rating_request().unwrap();
        assert_eq!(rating.findings[0].wpi, dec!(12.5));
        assert_eq!(rating.findings[0].apportionment_percent, dec!(50));
    }

    #[test]
    fn test_nested_finding_validation() {
        let blank_part = request(serde_json::json!({
            "occupation_title": "Packer",
            "age_at_injury": 40,
            "findings": [
                { "body_part_description": "knee", "wpi": "10" },
                { "body_part_description": "", "wpi": "5" }
            ]
        }));
        let errors = blank_part.validate().unwrap_err();
        assert!(errors.errors().contains_key("findings"));
        assert!(!errors.errors().contains_key("occupation_title"));
    }
}
