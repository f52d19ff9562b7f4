//! Infrastructure Table Layer
//!
//! Loads the rating schedule's reference tables from CSV files into an
//! immutable [`domain_rating::ReferenceTables`] snapshot.
//!
//! # Files
//!
//! | File | Table |
//! |------|-------|
//! | `occupations_rows.csv` | occupation titles and groups |
//! | `variants_rows.csv` | variant letters for groups below the split |
//! | `variants_2_rows.csv` | variant letters for groups at or above the split |
//! | `occupational_adjustments_rows.csv` | occupational adjustment by letter |
//! | `age_adjustment_rows.csv` | age adjustment by age bracket |
//!
//! Variant group columns are discovered from `group_<n>` headers.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_tables::TableLoader;
//!
//! let tables = TableLoader::new("data").load()?;
//! let store = TableStore::new(tables);
//! ```

pub mod error;
pub mod loader;
mod rows;

pub use error::LoadError;
pub use loader::{TableFiles, TableLoader};
pub use rows::{read_age_adjustments, read_occupational_adjustments, read_occupations, read_variant_table};
