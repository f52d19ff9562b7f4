//! Rating engine
//!
//! [`RatingEngine::rate`] runs the whole pipeline for one claimant:
//!
//! 1. classify the occupation once
//! 2. for each finding: classify the body part, resolve the variant and adjust
//! 3. combine the adjusted ratings by region
//! 4. compute weeks and payout
//! 5. project future medical costs for the rated body parts
//!
//! The request fails as a whole if any finding fails; there are no partial
//! results.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use core_kernel::{Money, Percent};
use crate::adjustment::{adjust, AdjustmentInput, AdjustmentTrace};
use crate::classifier::{ClassificationRules, OccupationMatch};
use crate::combiner::{combine, AdjustedImpairment, CombinedRating};
use crate::error::{RatingError, RatingStage};
use crate::finding::{BodyRegion, ClaimantContext, ImpairmentFinding};
use crate::medical::{FutureMedical, MedicalCostTable, PROJECTION_YEARS};
use crate::payout::{LifePensionTerms, Payout, PayoutSchedule};
use crate::ports::LookupProvider;
use crate::schedule::ScheduleConfig;
use crate::tables::VariantLetter;
use crate::variant::resolve_variant;

/// A claimant and their impairment findings, in report order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub claimant: ClaimantContext,
    pub findings: Vec<ImpairmentFinding>,
}

impl RatingRequest {
    pub fn new(claimant: ClaimantContext, findings: Vec<ImpairmentFinding>) -> Self {
        Self { claimant, findings }
    }
}

/// Trace of one finding through the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpairmentTrace {
    /// Position of the finding in the request
    pub index: usize,
    pub body_part_description: String,
    pub impairment_code: String,
    pub variant_body_part: String,
    pub body_region: BodyRegion,
    /// Label of the body-part rule that matched
    pub classification_rule: String,
    pub variant: VariantLetter,
    pub wpi: Decimal,
    pub pain_add_on: Decimal,
    pub adjustment: AdjustmentTrace,
    pub apportionment_percent: Decimal,
    /// Final rating after apportionment, when the finding is apportioned
    pub apportioned_rating: Option<Percent>,
    /// e.g. `15.03.02.05 - 20 - [1.0]23 - 360G - 26%`
    pub rating_string: String,
}

/// Combination and payout for one set of final ratings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub combination: CombinedRating,
    pub payout: Payout,
}

/// Output of [`RatingEngine::rate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResult {
    pub occupation_title: String,
    pub group_number: u16,
    pub occupation_match: OccupationMatch,
    pub age_at_injury: i32,
    pub impairments: Vec<ImpairmentTrace>,
    pub outcome: RatingOutcome,
    /// Outcome with apportionment applied, when any finding is apportioned
    pub apportioned: Option<RatingOutcome>,
    pub future_medical: FutureMedical,
}

impl RatingResult {
    pub fn combined_percent(&self) -> Percent {
        self.outcome.combination.combined_percent
    }

    pub fn weeks(&self) -> Decimal {
        self.outcome.payout.weeks
    }

    pub fn weekly_rate(&self) -> Money {
        self.outcome.payout.weekly_rate
    }

    pub fn total_payout(&self) -> Money {
        self.outcome.payout.total_payout
    }

    pub fn life_pension(&self) -> Option<&LifePensionTerms> {
        self.outcome.payout.life_pension.as_ref()
    }

    pub fn projected_medical_cost(&self) -> Money {
        self.future_medical.total_projected_cost
    }
}

/// The rating pipeline with its rules and schedule parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEngine {
    rules: ClassificationRules,
    schedule: ScheduleConfig,
    payout: PayoutSchedule,
    medical: MedicalCostTable,
}

impl RatingEngine {
    /// Uses the reference medical costs, priced in the payout currency
    pub fn new(rules: ClassificationRules, schedule: ScheduleConfig, payout: PayoutSchedule) -> Self {
        let medical = MedicalCostTable::reference(payout.weekly_rate().currency());
        Self {
            rules,
            schedule,
            payout,
            medical,
        }
    }

    pub fn with_medical_costs(mut self, medical: MedicalCostTable) -> Self {
        self.medical = medical;
        self
    }

    /// Reference rules, default schedule and reference brackets
    pub fn reference(weekly_rate: Money) -> Self {
        Self::new(
            ClassificationRules::reference(),
            ScheduleConfig::default(),
            PayoutSchedule::reference(weekly_rate),
        )
    }

    pub fn rules(&self) -> &ClassificationRules {
        &self.rules
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    pub fn payout_schedule(&self) -> &PayoutSchedule {
        &self.payout
    }

    pub fn medical_costs(&self) -> &MedicalCostTable {
        &self.medical
    }

    /// Rates every finding of a request and pays out the combined result
    pub fn rate<P: LookupProvider + ?Sized>(
        &self,
        tables: &P,
        request: &RatingRequest,
    ) -> Result<RatingResult, RatingError> {
        self.schedule.validate()?;
        validate_request(request)?;

        let claimant = &request.claimant;
        let occupation = self
            .rules
            .classify_occupation(tables, &claimant.occupation_title)?;

        let impairments = request
            .findings
            .iter()
            .enumerate()
            .map(|(index, finding)| {
                self.rate_finding(tables, occupation.group_number, claimant.age_at_injury, index, finding)
                    .map_err(|err| {
                        warn!(
                            index,
                            body_part = %finding.body_part_description,
                            stage = %err.stage(),
                            error = %err,
                            "Finding rejected"
                        );
                        err
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let final_ratings: Vec<AdjustedImpairment> = impairments
            .iter()
            .map(|i| AdjustedImpairment::new(i.body_region, i.adjustment.final_rating))
            .collect();
        let outcome = self.outcome(&final_ratings)?;

        let apportioned = if request.findings.iter().any(ImpairmentFinding::is_apportioned) {
            let reduced: Vec<AdjustedImpairment> = impairments
                .iter()
                .map(|i| {
                    let rating = i.apportioned_rating.unwrap_or(i.adjustment.final_rating);
                    AdjustedImpairment::new(i.body_region, rating)
                })
                .collect();
            Some(self.outcome(&reduced)?)
        } else {
            None
        };

        let future_medical = self.medical.estimate(
            impairments
                .iter()
                .map(|i| (i.index, i.variant_body_part.as_str(), i.wpi)),
            self.schedule.medical_inflation_rate,
            PROJECTION_YEARS,
        );

        info!(
            occupation = %claimant.occupation_title,
            group_number = occupation.group_number,
            findings = impairments.len(),
            combined = %outcome.combination.combined_percent,
            total_payout = %outcome.payout.total_payout,
            apportioned = apportioned.is_some(),
            projected_medical = %future_medical.total_projected_cost,
            "Rating computed"
        );

        Ok(RatingResult {
            occupation_title: claimant.occupation_title.clone(),
            group_number: occupation.group_number,
            occupation_match: occupation.matched,
            age_at_injury: claimant.age_at_injury,
            impairments,
            outcome,
            apportioned,
            future_medical,
        })
    }

    fn rate_finding<P: LookupProvider + ?Sized>(
        &self,
        tables: &P,
        group_number: u16,
        age_at_injury: i32,
        index: usize,
        finding: &ImpairmentFinding,
    ) -> Result<ImpairmentTrace, RatingError> {
        let body_part = self.rules.classify_body_part(&finding.body_part_description)?;
        let variant = resolve_variant(
            tables,
            group_number,
            &body_part.variant_body_part,
            &body_part.impairment_code,
        )?;
        let adjustment = adjust(
            tables,
            &self.schedule,
            &AdjustmentInput {
                wpi: finding.wpi,
                pain_add_on: finding.pain_add_on,
                group_number,
                variant,
                age_at_injury,
            },
        )?;

        let apportioned_rating = if finding.is_apportioned() {
            let share = Decimal::ONE - finding.apportionment_percent / Decimal::ONE_HUNDRED;
            let value = adjustment.final_rating.value() * share;
            let rating = Percent::new(value).map_err(|_| RatingError::RatingOutOfRange {
                stage: RatingStage::Combination,
                value,
            })?;
            Some(rating)
        } else {
            None
        };

        let rating_string = format!(
            "{} - {} - [{}]{} - {}{} - {}%",
            body_part.impairment_code,
            finding.wpi.normalize(),
            format_factor(self.schedule.earning_capacity_factor),
            adjustment
                .adjusted_rating
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize(),
            group_number,
            variant,
            adjustment.final_rating.value(),
        );

        debug!(index, rating = %rating_string, "Finding rated");

        Ok(ImpairmentTrace {
            index,
            body_part_description: finding.body_part_description.clone(),
            impairment_code: body_part.impairment_code,
            variant_body_part: body_part.variant_body_part,
            body_region: body_part.region,
            classification_rule: body_part.rule,
            variant,
            wpi: finding.wpi,
            pain_add_on: finding.pain_add_on,
            adjustment,
            apportionment_percent: finding.apportionment_percent,
            apportioned_rating,
            rating_string,
        })
    }

    fn outcome(&self, ratings: &[AdjustedImpairment]) -> Result<RatingOutcome, RatingError> {
        let combination = combine(ratings, self.schedule.combined_precision)?;
        let payout = self
            .payout
            .compute_payout(combination.combined_percent.value())?;
        Ok(RatingOutcome {
            combination,
            payout,
        })
    }
}

fn validate_request(request: &RatingRequest) -> Result<(), RatingError> {
    if request.claimant.occupation_title.trim().is_empty() {
        return Err(RatingError::invalid_input("occupation title is empty"));
    }
    if request.findings.is_empty() {
        return Err(RatingError::invalid_input("request has no impairment findings"));
    }
    for (index, finding) in request.findings.iter().enumerate() {
        finding.validate().map_err(|err| match err {
            RatingError::InvalidInput(message) => {
                RatingError::InvalidInput(format!("finding {}: {}", index, message))
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Earning capacity factor as printed in a rating string: every significant
/// digit, and at least one decimal place
fn format_factor(factor: Decimal) -> String {
    let factor = factor.normalize();
    if factor.scale() == 0 {
        format!("{:.1}", factor)
    } else {
        factor.to_string()
    }
}
