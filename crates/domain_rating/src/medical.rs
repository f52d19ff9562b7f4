//! Future medical cost projection
//!
//! Each rated impairment gets an annual cost estimate: the base cost of its
//! body part scaled up by its WPI. The yearly total is then projected over
//! [`PROJECTION_YEARS`] with medical inflation compounding once a year.
//! Estimates are whole currency units, rounded half-up.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, Money};
use crate::error::TableError;

/// Years covered by a projection
pub const PROJECTION_YEARS: u32 = 10;

/// Annual estimate for one rated impairment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalCostItem {
    /// Position of the finding in the request
    pub index: usize,
    pub variant_body_part: String,
    pub wpi: Decimal,
    pub base_cost: Money,
    pub annual_cost: Money,
}

/// Annual and projected medical costs of a rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureMedical {
    pub items: Vec<MedicalCostItem>,
    pub inflation_rate: Decimal,
    pub years: u32,
    pub total_annual_cost: Money,
    pub total_projected_cost: Money,
}

/// Annual base cost per variant body part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalCostTable {
    base_costs: BTreeMap<String, Money>,
    /// Used for body parts without an entry
    default_cost: Money,
}

impl MedicalCostTable {
    pub fn new(default_cost: Money) -> Result<Self, TableError> {
        let default_cost = non_negative_cost("default", default_cost)?;
        Ok(Self {
            base_costs: BTreeMap::new(),
            default_cost,
        })
    }

    /// Adds or replaces the base cost of a body part
    pub fn with_cost(mut self, body_part: &str, cost: Money) -> Result<Self, TableError> {
        let key = body_part_key(body_part);
        if key.is_empty() {
            return Err(TableError::InvalidMedicalCost("body part is empty".to_string()));
        }
        if cost.currency() != self.default_cost.currency() {
            return Err(TableError::InvalidMedicalCost(format!(
                "{} is priced in {}, table uses {}",
                key,
                cost.currency(),
                self.default_cost.currency()
            )));
        }
        let cost = non_negative_cost(&key, cost)?;
        self.base_costs.insert(key, cost);
        Ok(self)
    }

    /// Reference base costs; body parts not listed cost 2000 a year
    pub fn reference(currency: Currency) -> Self {
        let base_costs = [
            ("SPINE", dec!(5000)),
            ("HIP", dec!(4000)),
            ("KNEE", dec!(3000)),
            ("SHOULDER", dec!(3000)),
            ("ANKLE", dec!(2500)),
            ("ELBOW", dec!(2000)),
            ("WRIST", dec!(2000)),
        ]
        .into_iter()
        .map(|(part, amount)| (part.to_string(), Money::new(amount, currency)))
        .collect();

        Self {
            base_costs,
            default_cost: Money::new(dec!(2000), currency),
        }
    }

    pub fn currency(&self) -> Currency {
        self.default_cost.currency()
    }

    pub fn default_cost(&self) -> Money {
        self.default_cost
    }

    /// Base cost of a body part, case-insensitive
    pub fn base_cost(&self, body_part: &str) -> Money {
        self.base_costs
            .get(&body_part_key(body_part))
            .copied()
            .unwrap_or(self.default_cost)
    }

    /// `base x (1 + wpi / 100)`
    pub fn annual_cost(&self, body_part: &str, wpi: Decimal) -> Money {
        let base = self.base_cost(body_part);
        whole_units(base.multiply(Decimal::ONE + wpi / Decimal::ONE_HUNDRED))
    }

    /// Estimates every impairment and projects the yearly total
    ///
    /// Impairments are `(index, variant body part, wpi)`.
    pub fn estimate<'a>(
        &self,
        impairments: impl IntoIterator<Item = (usize, &'a str, Decimal)>,
        inflation_rate: Decimal,
        years: u32,
    ) -> FutureMedical {
        let items: Vec<MedicalCostItem> = impairments
            .into_iter()
            .map(|(index, body_part, wpi)| MedicalCostItem {
                index,
                variant_body_part: body_part.to_string(),
                wpi,
                base_cost: self.base_cost(body_part),
                annual_cost: self.annual_cost(body_part, wpi),
            })
            .collect();

        let total_annual_cost = Money::new(
            items.iter().map(|item| item.annual_cost.amount()).sum(),
            self.currency(),
        );
        let total_projected_cost = project_cost(total_annual_cost, inflation_rate, years);

        debug!(
            items = items.len(),
            annual = %total_annual_cost,
            projected = %total_projected_cost,
            %inflation_rate,
            "Future medical estimated"
        );

        FutureMedical {
            items,
            inflation_rate,
            years,
            total_annual_cost,
            total_projected_cost,
        }
    }
}

/// Sum of `years` yearly costs, the first at `annual` and each following
/// year grown by `inflation_rate`
pub fn project_cost(annual: Money, inflation_rate: Decimal, years: u32) -> Money {
    let growth = Decimal::ONE + inflation_rate;
    let mut yearly = annual.amount();
    let mut total = Decimal::ZERO;
    for _ in 0..years {
        total += yearly;
        yearly *= growth;
    }
    whole_units(Money::new(total, annual.currency()))
}

fn whole_units(money: Money) -> Money {
    Money::new(
        money
            .amount()
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        money.currency(),
    )
}

fn body_part_key(body_part: &str) -> String {
    body_part.trim().to_uppercase()
}

fn non_negative_cost(body_part: &str, cost: Money) -> Result<Money, TableError> {
    Money::non_negative(cost.amount(), cost.currency())
        .map_err(|e| TableError::InvalidMedicalCost(format!("{}: {}", body_part, e)))
}
