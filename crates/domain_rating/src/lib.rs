//! Permanent Disability Rating Domain
//!
//! This crate implements the rating schedule pipeline that turns a list of
//! whole-person-impairment (WPI) findings into a combined permanent
//! disability percentage and a payout.
//!
//! # Pipeline
//!
//! ```text
//! Classifier -> Variant Resolver -> Adjustment Pipeline -> Combiner -> Payout Calculator
//!      \______________ Lookup Provider (ReferenceTables) ______________/
//! ```
//!
//! Every stage is a pure function of its inputs and an immutable
//! [`ReferenceTables`] snapshot. Snapshots are shared through a
//! [`TableStore`], which swaps whole snapshots so in-flight ratings always
//! see a consistent schedule.
//!
//! Alongside the payout, [`MedicalCostTable`] projects future medical costs
//! for the rated body parts.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_rating::{RatingEngine, RatingRequest, ClaimantContext, ImpairmentFinding};
//!
//! let engine = RatingEngine::reference(weekly_rate);
//! let request = RatingRequest::new(
//!     ClaimantContext::new("Packer", 45),
//!     vec![ImpairmentFinding::new("lower back", dec!(20)).with_pain_add_on(dec!(5))],
//! );
//!
//! let result = engine.rate(&*store.snapshot(), &request)?;
//! println!("{} -> {}", result.combined_percent(), result.total_payout());
//! ```

pub mod error;
pub mod finding;
pub mod tables;
pub mod ports;
pub mod bucket;
pub mod classifier;
pub mod variant;
pub mod schedule;
pub mod adjustment;
pub mod combiner;
pub mod payout;
pub mod medical;
pub mod engine;
pub mod store;

pub use error::{RatingError, RatingStage, TableError, VariantMiss};
pub use finding::{BodyRegion, ClaimantContext, ImpairmentFinding};
pub use tables::{
    AgeAdjustmentRecord, AgeBracket, Bucketed, OccupationRecord, OccupationalAdjustmentRecord,
    ReferenceTables, TableSummary, VariantLetter, VariantRecord, VariantTable, VariantTables,
};
pub use ports::LookupProvider;
pub use bucket::BucketStrategy;
pub use classifier::{
    BodyPartClassification, BodyPartRule, Classification, ClassificationRules,
    OccupationClassification, OccupationMatch, OccupationRule,
};
pub use variant::resolve_variant;
pub use schedule::ScheduleConfig;
pub use adjustment::{adjust, AdjustmentInput, AdjustmentTrace};
pub use combiner::{
    combine, combine_pair, combine_values, AdjustedImpairment, CombinationStep, CombinedRating,
    RegionRating,
};
pub use payout::{LifePensionTerms, Payout, PayoutSchedule, WeeksBracket};
pub use medical::{project_cost, FutureMedical, MedicalCostItem, MedicalCostTable, PROJECTION_YEARS};
pub use engine::{ImpairmentTrace, RatingEngine, RatingOutcome, RatingRequest, RatingResult};
pub use store::TableStore;
