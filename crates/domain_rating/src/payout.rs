//! Payout calculation
//!
//! The combined percentage selects a weeks bracket; each whole or partial
//! percent within the rating earns that bracket's number of weeks, and the
//! weeks are paid at the weekly rate.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, Money, Percent};
use crate::error::{RatingError, RatingStage, TableError};

/// A `[from, to)` range of combined percentages and its weeks multiplier
///
/// The last bracket of a schedule also includes `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeksBracket {
    pub from: Decimal,
    pub to: Decimal,
    pub weeks_per_percent: Decimal,
}

impl WeeksBracket {
    pub fn new(from: Decimal, to: Decimal, weeks_per_percent: Decimal) -> Self {
        Self {
            from,
            to,
            weeks_per_percent,
        }
    }
}

/// Lifetime benefit that starts once the rating reaches `threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifePensionTerms {
    pub threshold: Decimal,
    pub weekly_rate: Money,
    pub max_weekly_earnings: Money,
}

impl LifePensionTerms {
    pub fn reference(currency: Currency) -> Self {
        Self {
            threshold: dec!(70),
            weekly_rate: Money::new(dec!(85.00), currency),
            max_weekly_earnings: Money::new(dec!(515.38), currency),
        }
    }
}

/// Weeks and amount owed for a combined rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub combined_percent: Decimal,
    pub bracket: WeeksBracket,
    pub weeks: Decimal,
    pub weekly_rate: Money,
    pub total_payout: Money,
    /// Present when the rating qualifies for a life pension
    pub life_pension: Option<LifePensionTerms>,
}

/// Bracket table and weekly rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSchedule {
    brackets: Vec<WeeksBracket>,
    weekly_rate: Money,
    life_pension: Option<LifePensionTerms>,
}

impl PayoutSchedule {
    /// Builds a schedule from ordered, contiguous brackets
    pub fn new(brackets: Vec<WeeksBracket>, weekly_rate: Money) -> Result<Self, TableError> {
        let first = brackets
            .first()
            .ok_or_else(|| TableError::InvalidBracket("schedule has no brackets".to_string()))?;
        if first.from > Decimal::ZERO {
            return Err(TableError::InvalidBracket(format!(
                "first bracket starts at {} instead of 0",
                first.from
            )));
        }
        if let Some(bracket) = brackets.iter().find(|b| b.from >= b.to) {
            return Err(TableError::InvalidBracket(format!(
                "bracket [{}, {}) is empty",
                bracket.from, bracket.to
            )));
        }
        if let Some(bracket) = brackets.iter().find(|b| b.weeks_per_percent < Decimal::ZERO) {
            return Err(TableError::InvalidBracket(format!(
                "bracket [{}, {}) has negative weeks",
                bracket.from, bracket.to
            )));
        }
        if let Some(pair) = brackets.windows(2).find(|pair| pair[0].to != pair[1].from) {
            return Err(TableError::InvalidBracket(format!(
                "bracket ending at {} is followed by one starting at {}",
                pair[0].to, pair[1].from
            )));
        }
        let weekly_rate = Money::non_negative(weekly_rate.amount(), weekly_rate.currency())
            .map_err(|e| TableError::InvalidBracket(format!("weekly rate: {}", e)))?;

        Ok(Self {
            brackets,
            weekly_rate,
            life_pension: None,
        })
    }

    /// Brackets of the reference schedule at the given weekly rate
    pub fn reference(weekly_rate: Money) -> Self {
        let currency = weekly_rate.currency();
        Self {
            brackets: vec![
                WeeksBracket::new(dec!(0), dec!(10), dec!(4)),
                WeeksBracket::new(dec!(10), dec!(24.75), dec!(5)),
                WeeksBracket::new(dec!(24.75), dec!(29.75), dec!(6)),
                WeeksBracket::new(dec!(29.75), dec!(49.75), dec!(7)),
                WeeksBracket::new(dec!(49.75), dec!(69.75), dec!(8)),
                WeeksBracket::new(dec!(69.75), dec!(100), dec!(9)),
            ],
            weekly_rate,
            life_pension: Some(LifePensionTerms::reference(currency)),
        }
    }

    pub fn with_life_pension(mut self, terms: Option<LifePensionTerms>) -> Self {
        self.life_pension = terms;
        self
    }

    pub fn brackets(&self) -> &[WeeksBracket] {
        &self.brackets
    }

    pub fn weekly_rate(&self) -> Money {
        self.weekly_rate
    }

    pub fn life_pension(&self) -> Option<&LifePensionTerms> {
        self.life_pension.as_ref()
    }

    fn bracket_for(&self, percent: Decimal) -> Option<&WeeksBracket> {
        let last = self.brackets.len().checked_sub(1)?;
        self.brackets.iter().enumerate().find_map(|(i, b)| {
            let within = percent >= b.from && (percent < b.to || (i == last && percent == b.to));
            within.then_some(b)
        })
    }

    /// Converts a combined percentage into weeks and a payout
    ///
    /// Weeks are rounded half-up to 2 decimal places and the payout to the
    /// currency's minor unit.
    pub fn compute_payout(&self, combined_percent: Decimal) -> Result<Payout, RatingError> {
        let out_of_range = || RatingError::RatingOutOfRange {
            stage: RatingStage::Payout,
            value: combined_percent,
        };
        if !Percent::in_range(combined_percent) {
            return Err(out_of_range());
        }
        let bracket = *self.bracket_for(combined_percent).ok_or_else(out_of_range)?;

        let weeks = (combined_percent * bracket.weeks_per_percent)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let total_payout = self.weekly_rate.multiply(weeks).round_to_currency();
        let life_pension = self
            .life_pension
            .filter(|terms| combined_percent >= terms.threshold);

        debug!(
            %combined_percent,
            %weeks,
            total_payout = %total_payout,
            life_pension = life_pension.is_some(),
            "Payout computed"
        );

        Ok(Payout {
            combined_percent,
            bracket,
            weeks,
            weekly_rate: self.weekly_rate,
            total_payout,
            life_pension,
        })
    }
}
