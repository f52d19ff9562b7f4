//! API configuration

use std::path::PathBuf;

use core_kernel::{Currency, Money};
use domain_rating::{
    BucketStrategy, ClassificationRules, PayoutSchedule, RatingEngine, RatingError, ScheduleConfig,
    VariantTables,
};
use infra_tables::TableLoader;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Directory holding the reference table CSV files
    pub tables_dir: PathBuf,
    /// First group number served by the high variant table
    pub split_group: u16,
    /// Weekly benefit rate
    pub weekly_rate: Decimal,
    pub currency: Currency,
    pub pain_add_on_cap: Decimal,
    pub earning_capacity_factor: Decimal,
    pub bucket_strategy: BucketStrategy,
    /// Decimal places of the combined rating
    pub combined_precision: u32,
    /// Group for occupations no rule matches; unset rejects them
    pub default_group: Option<u16>,
    pub fuzzy_occupation_matching: bool,
    /// Yearly growth of projected medical costs, e.g. 0.03
    pub medical_inflation_rate: Decimal,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            tables_dir: PathBuf::from("data"),
            split_group: VariantTables::REFERENCE_SPLIT,
            weekly_rate: dec!(290.00),
            currency: Currency::USD,
            pain_add_on_cap: dec!(3),
            earning_capacity_factor: Decimal::ONE,
            bucket_strategy: BucketStrategy::Nearest,
            combined_precision: 0,
            default_group: None,
            fuzzy_occupation_matching: true,
            medical_inflation_rate: dec!(0.03),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn weekly_rate(&self) -> Result<Money, RatingError> {
        Money::non_negative(self.weekly_rate, self.currency)
            .map_err(|e| RatingError::invalid_input(format!("weekly rate: {}", e)))
    }

    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig::default()
            .with_pain_add_on_cap(self.pain_add_on_cap)
            .with_earning_capacity_factor(self.earning_capacity_factor)
            .with_bucket_strategy(self.bucket_strategy)
            .with_combined_precision(self.combined_precision)
            .with_medical_inflation_rate(self.medical_inflation_rate)
    }

    pub fn rules(&self) -> ClassificationRules {
        let mut rules = ClassificationRules::reference().with_default_group(self.default_group);
        rules.fuzzy_occupation_matching = self.fuzzy_occupation_matching;
        rules
    }

    /// Builds the rating engine, rejecting invalid schedule parameters
    pub fn engine(&self) -> Result<RatingEngine, RatingError> {
        let schedule = self.schedule();
        schedule.validate()?;
        Ok(RatingEngine::new(
            self.rules(),
            schedule,
            PayoutSchedule::reference(self.weekly_rate()?),
        ))
    }

    pub fn table_loader(&self) -> TableLoader {
        TableLoader::new(&self.tables_dir).with_split_group(self.split_group)
    }
}
