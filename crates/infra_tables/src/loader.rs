//! Loading a full snapshot from a directory of CSV files

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use domain_rating::{ReferenceTables, VariantTables};
use tracing::info;

use crate::error::LoadError;
use crate::rows::{read_age_adjustments, read_occupational_adjustments, read_occupations, read_variant_table};

/// Paths of the five table files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFiles {
    pub occupations: PathBuf,
    pub low_variants: PathBuf,
    pub high_variants: PathBuf,
    pub occupational_adjustments: PathBuf,
    pub age_adjustments: PathBuf,
}

impl TableFiles {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            occupations: dir.join("occupations_rows.csv"),
            low_variants: dir.join("variants_rows.csv"),
            high_variants: dir.join("variants_2_rows.csv"),
            occupational_adjustments: dir.join("occupational_adjustments_rows.csv"),
            age_adjustments: dir.join("age_adjustment_rows.csv"),
        }
    }
}

/// Builds [`ReferenceTables`] snapshots from table files
#[derive(Debug, Clone)]
pub struct TableLoader {
    files: TableFiles,
    split_group: u16,
}

impl TableLoader {
    /// Loader for the standard files in `dir` with the reference split
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::from_files(TableFiles::in_dir(dir))
    }

    pub fn from_files(files: TableFiles) -> Self {
        Self {
            files,
            split_group: VariantTables::REFERENCE_SPLIT,
        }
    }

    /// Sets the first group number served by the high variant table
    pub fn with_split_group(mut self, split_group: u16) -> Self {
        self.split_group = split_group;
        self
    }

    pub fn files(&self) -> &TableFiles {
        &self.files
    }

    /// Reads all five files and validates them as one snapshot
    pub fn load(&self) -> Result<ReferenceTables, LoadError> {
        let occupations = read_occupations(open(&self.files.occupations)?)?;
        let low = read_variant_table("low variant", open(&self.files.low_variants)?)?;
        let high = read_variant_table("high variant", open(&self.files.high_variants)?)?;
        let occupational =
            read_occupational_adjustments(open(&self.files.occupational_adjustments)?)?;
        let age = read_age_adjustments(open(&self.files.age_adjustments)?)?;

        let variants = VariantTables::new(self.split_group, low, high)?;
        let tables = ReferenceTables::new(occupations, variants, occupational, age)?;

        let summary = tables.summary();
        info!(
            snapshot_id = %summary.snapshot_id,
            occupations = summary.occupations,
            low_variant_rows = summary.low_variant_rows,
            high_variant_rows = summary.high_variant_rows,
            occupational_buckets = summary.occupational_buckets,
            age_buckets = summary.age_buckets,
            split_group = summary.split_group,
            "Reference tables loaded"
        );

        Ok(tables)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}
