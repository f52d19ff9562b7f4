//! Bucket resolution for the adjustment tables
//!
//! Adjustment tables are keyed by discrete percentages. A computed rating
//! rarely lands on a key exactly, so each lookup resolves the value to one
//! bucket with a [`BucketStrategy`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tables::Bucketed;

/// How a value is matched to a bucket key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketStrategy {
    /// Smallest absolute difference; a tie goes to the lower bucket
    #[default]
    Nearest,
    /// Greatest key not above the value, else the lowest key
    Floor,
}

impl BucketStrategy {
    /// Resolves `value` against rows sorted ascending by key
    ///
    /// Returns `None` only when `rows` is empty.
    pub fn resolve<'a, T: Bucketed>(&self, rows: &'a [T], value: Decimal) -> Option<&'a T> {
        let split = rows.partition_point(|row| row.bucket_key() <= value);
        let below = split.checked_sub(1).and_then(|i| rows.get(i));
        let above = rows.get(split);

        match self {
            BucketStrategy::Nearest => match (below, above) {
                (Some(lower), Some(upper)) => {
                    let down = value - lower.bucket_key();
                    let up = upper.bucket_key() - value;
                    if up < down {
                        Some(upper)
                    } else {
                        Some(lower)
                    }
                }
                (lower, upper) => lower.or(upper),
            },
            BucketStrategy::Floor => below.or_else(|| rows.first()),
        }
    }
}

impl fmt::Display for BucketStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketStrategy::Nearest => f.write_str("nearest"),
            BucketStrategy::Floor => f.write_str("floor"),
        }
    }
}

impl FromStr for BucketStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(BucketStrategy::Nearest),
            "floor" => Ok(BucketStrategy::Floor),
            other => Err(format!("unknown bucket strategy '{}'", other)),
        }
    }
}
