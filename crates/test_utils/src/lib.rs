//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! rating engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Reference tables and requests with known outcomes
//! - `builders`: Builder patterns for rating requests
//! - `assertions`: Custom assertion helpers for rating results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
