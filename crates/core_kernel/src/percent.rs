//! Percentages on the 0-100 rating scale
//!
//! Impairment, disability and apportionment figures are all expressed as a
//! percentage of the whole person. `Percent` guarantees the value lies in
//! `[0, 100]` so a rating can never silently exceed total disability.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when constructing a percentage
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PercentError {
    #[error("{0} is outside the 0-100 percent scale")]
    OutOfRange(Decimal),
}

/// A percentage in the closed interval `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);
    pub const HUNDRED: Percent = Percent(Decimal::ONE_HUNDRED);

    /// Creates a percentage, rejecting values outside `[0, 100]`
    pub fn new(value: Decimal) -> Result<Self, PercentError> {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(PercentError::OutOfRange(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Returns true when the value lies on the 0-100 scale
    pub fn in_range(value: Decimal) -> bool {
        value >= Decimal::ZERO && value <= dec!(100)
    }

    /// Returns the raw decimal value (e.g. `23.5` for 23.5%)
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Rounds half-up to `dp` decimal places
    pub fn round_half_up(&self, dp: u32) -> Percent {
        Percent(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
                .normalize(),
        )
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = PercentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percent::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(percent: Percent) -> Decimal {
        percent.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
