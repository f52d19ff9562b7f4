//! Test Data Builders
//!
//! Provides builder patterns for constructing rating requests with sensible
//! defaults. Tests specify only the fields they care about.

use domain_rating::{ClaimantContext, ImpairmentFinding, RatingRequest};
use rust_decimal::Decimal;

/// Builder for constructing rating requests
pub struct RatingRequestBuilder {
    occupation_title: String,
    age_at_injury: i32,
    findings: Vec<ImpairmentFinding>,
}

impl Default for RatingRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingRequestBuilder {
    /// Creates a builder for a 40 year old packer with no findings
    pub fn new() -> Self {
        Self {
            occupation_title: "Packer".to_string(),
            age_at_injury: 40,
            findings: Vec::new(),
        }
    }

    /// Sets the occupation title
    pub fn occupation(mut self, title: impl Into<String>) -> Self {
        self.occupation_title = title.into();
        self
    }

    /// Sets the age at injury
    pub fn age(mut self, age: i32) -> Self {
        self.age_at_injury = age;
        self
    }

    /// Adds a finding without pain add-on
    pub fn finding(mut self, body_part: &str, wpi: Decimal) -> Self {
        self.findings.push(ImpairmentFinding::new(body_part, wpi));
        self
    }

    /// Adds a finding with a pain add-on
    pub fn finding_with_pain(mut self, body_part: &str, wpi: Decimal, pain: Decimal) -> Self {
        self.findings
            .push(ImpairmentFinding::new(body_part, wpi).with_pain_add_on(pain));
        self
    }

    /// Adds a fully specified finding
    pub fn with_finding(mut self, finding: ImpairmentFinding) -> Self {
        self.findings.push(finding);
        self
    }

    /// Builds the request
    pub fn build(self) -> RatingRequest {
        RatingRequest::new(
            ClaimantContext::new(self.occupation_title, self.age_at_injury),
            self.findings,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_defaults() {
        let request = RatingRequestBuilder::new().build();
        assert_eq!(request.claimant.occupation_title, "Packer");
        assert_eq!(request.claimant.age_at_injury, 40);
        assert!(request.findings.is_empty());
    }

    #[test]
    fn test_builder_findings_keep_order() {
        let request = RatingRequestBuilder::new()
            .finding("knee", dec!(10))
            .finding_with_pain("lower back", dec!(12), dec!(2))
            .build();

        assert_eq!(request.findings.len(), 2);
        assert_eq!(request.findings[0].body_part_description, "knee");
        assert_eq!(request.findings[1].pain_add_on, dec!(2));
    }
}
