//! Rating schedule parameters

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bucket::BucketStrategy;
use crate::error::RatingError;

/// Parameters of the adjustment and combination stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Upper bound on the pain add-on
    pub pain_add_on_cap: Decimal,
    /// Multiplier applied to the base rating before the occupational lookup
    pub earning_capacity_factor: Decimal,
    /// Bucket matching for both adjustment tables
    pub bucket_strategy: BucketStrategy,
    /// Decimal places of the combined percentage
    pub combined_precision: u32,
    /// Yearly growth of future medical costs, as a fraction (0.03 is 3%)
    pub medical_inflation_rate: Decimal,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            pain_add_on_cap: dec!(3),
            earning_capacity_factor: Decimal::ONE,
            bucket_strategy: BucketStrategy::Nearest,
            combined_precision: 0,
            medical_inflation_rate: dec!(0.03),
        }
    }
}

impl ScheduleConfig {
    pub fn with_pain_add_on_cap(mut self, cap: Decimal) -> Self {
        self.pain_add_on_cap = cap;
        self
    }

    pub fn with_earning_capacity_factor(mut self, factor: Decimal) -> Self {
        self.earning_capacity_factor = factor;
        self
    }

    pub fn with_bucket_strategy(mut self, strategy: BucketStrategy) -> Self {
        self.bucket_strategy = strategy;
        self
    }

    pub fn with_combined_precision(mut self, dp: u32) -> Self {
        self.combined_precision = dp;
        self
    }

    pub fn with_medical_inflation_rate(mut self, rate: Decimal) -> Self {
        self.medical_inflation_rate = rate;
        self
    }

    pub fn validate(&self) -> Result<(), RatingError> {
        if self.pain_add_on_cap < Decimal::ZERO {
            return Err(RatingError::invalid_input(format!(
                "pain add-on cap {} is negative",
                self.pain_add_on_cap
            )));
        }
        if self.earning_capacity_factor <= Decimal::ZERO {
            return Err(RatingError::invalid_input(format!(
                "earning capacity factor {} must be positive",
                self.earning_capacity_factor
            )));
        }
        if self.medical_inflation_rate < Decimal::ZERO || self.medical_inflation_rate > Decimal::ONE {
            return Err(RatingError::invalid_input(format!(
                "medical inflation rate {} must be between 0 and 1",
                self.medical_inflation_rate
            )));
        }
        Ok(())
    }
}
