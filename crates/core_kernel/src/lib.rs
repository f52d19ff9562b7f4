//! Core Kernel - Foundational value objects for the disability rating system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money types with precise decimal arithmetic for payouts
//! - Percent values bounded to the 0-100 rating scale
//! - Strongly-typed identifiers

pub mod money;
pub mod percent;
pub mod identifiers;

pub use money::{Money, Currency, MoneyError};
pub use percent::{Percent, PercentError};
pub use identifiers::{RatingId, SnapshotId};
