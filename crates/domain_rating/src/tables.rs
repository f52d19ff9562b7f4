//! Reference tables of the rating schedule
//!
//! A [`ReferenceTables`] value is an immutable snapshot of the four lookup
//! tables. Construction sorts every bucketed table by key and rejects
//! duplicate keys, so lookups can rely on a strict total order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use core_kernel::SnapshotId;
use crate::error::TableError;

/// Occupational variant letter, one column of the occupational adjustment table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantLetter {
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
}

impl VariantLetter {
    pub const ALL: [VariantLetter; 8] = [
        VariantLetter::C,
        VariantLetter::D,
        VariantLetter::E,
        VariantLetter::F,
        VariantLetter::G,
        VariantLetter::H,
        VariantLetter::I,
        VariantLetter::J,
    ];

    /// Column position in the occupational adjustment table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        match self {
            VariantLetter::C => 'c',
            VariantLetter::D => 'd',
            VariantLetter::E => 'e',
            VariantLetter::F => 'f',
            VariantLetter::G => 'g',
            VariantLetter::H => 'h',
            VariantLetter::I => 'i',
            VariantLetter::J => 'j',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        VariantLetter::ALL
            .into_iter()
            .find(|letter| letter.as_char() == c.to_ascii_lowercase())
    }
}

impl fmt::Display for VariantLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char().to_ascii_uppercase())
    }
}

impl FromStr for VariantLetter {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => VariantLetter::from_char(c)
                .ok_or_else(|| TableError::InvalidVariantLetter(trimmed.to_string())),
            _ => Err(TableError::InvalidVariantLetter(trimmed.to_string())),
        }
    }
}

/// Age bracket columns of the age adjustment table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    UpTo21,
    From22To26,
    From27To31,
    From32To36,
    From37To41,
    From42To46,
    From47To51,
    From52To56,
    From57To61,
    From62,
}

/// Lower bound of each bracket, ascending
const AGE_BRACKET_FLOORS: [(i32, AgeBracket); 10] = [
    (0, AgeBracket::UpTo21),
    (22, AgeBracket::From22To26),
    (27, AgeBracket::From27To31),
    (32, AgeBracket::From32To36),
    (37, AgeBracket::From37To41),
    (42, AgeBracket::From42To46),
    (47, AgeBracket::From47To51),
    (52, AgeBracket::From52To56),
    (57, AgeBracket::From57To61),
    (62, AgeBracket::From62),
];

impl AgeBracket {
    pub const ALL: [AgeBracket; 10] = [
        AgeBracket::UpTo21,
        AgeBracket::From22To26,
        AgeBracket::From27To31,
        AgeBracket::From32To36,
        AgeBracket::From37To41,
        AgeBracket::From42To46,
        AgeBracket::From47To51,
        AgeBracket::From52To56,
        AgeBracket::From57To61,
        AgeBracket::From62,
    ];

    /// Returns the bracket containing `age`, or `None` for a negative age
    pub fn for_age(age: i32) -> Option<AgeBracket> {
        AGE_BRACKET_FLOORS
            .iter()
            .rev()
            .find(|(floor, _)| age >= *floor)
            .map(|(_, bracket)| *bracket)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column header used by the age adjustment table file
    pub fn column_name(self) -> &'static str {
        match self {
            AgeBracket::UpTo21 => "21_and_under",
            AgeBracket::From22To26 => "22_to_26",
            AgeBracket::From27To31 => "27_to_31",
            AgeBracket::From32To36 => "32_to_36",
            AgeBracket::From37To41 => "37_to_41",
            AgeBracket::From42To46 => "42_to_46",
            AgeBracket::From47To51 => "47_to_51",
            AgeBracket::From52To56 => "52_to_56",
            AgeBracket::From57To61 => "57_to_61",
            AgeBracket::From62 => "62_and_over",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A row of the occupation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationRecord {
    pub group_number: u16,
    pub title: String,
    pub industry: String,
}

impl OccupationRecord {
    pub fn new(group_number: u16, title: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            group_number,
            title: title.into(),
            industry: industry.into(),
        }
    }
}

/// A row of a variant table keyed by `(body_part, impairment_code)`
///
/// Groups whose cell is empty are absent from `letters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub body_part: String,
    pub impairment_code: String,
    pub letters: BTreeMap<u16, VariantLetter>,
}

impl VariantRecord {
    pub fn new(body_part: impl Into<String>, impairment_code: impl Into<String>) -> Self {
        Self {
            body_part: body_part.into(),
            impairment_code: impairment_code.into(),
            letters: BTreeMap::new(),
        }
    }

    pub fn with_letter(mut self, group_number: u16, letter: VariantLetter) -> Self {
        self.letters.insert(group_number, letter);
        self
    }

    pub fn letter_for(&self, group_number: u16) -> Option<VariantLetter> {
        self.letters.get(&group_number).copied()
    }

    fn matches(&self, body_part: &str, impairment_code: &str) -> bool {
        self.body_part.eq_ignore_ascii_case(body_part.trim())
            && self.impairment_code.eq_ignore_ascii_case(impairment_code.trim())
    }
}

/// One physical variant table: its group columns and rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantTable {
    groups: BTreeSet<u16>,
    rows: Vec<VariantRecord>,
}

impl VariantTable {
    /// Builds a table, checking that rows only use declared group columns
    /// and that no `(body_part, impairment_code)` key repeats
    pub fn new(
        groups: impl IntoIterator<Item = u16>,
        rows: Vec<VariantRecord>,
    ) -> Result<Self, TableError> {
        let groups: BTreeSet<u16> = groups.into_iter().collect();

        for (i, row) in rows.iter().enumerate() {
            if let Some(group_number) = row.letters.keys().find(|g| !groups.contains(g)) {
                return Err(TableError::UnknownVariantGroup {
                    group_number: *group_number,
                    body_part: row.body_part.clone(),
                });
            }
            if rows[..i]
                .iter()
                .any(|earlier| earlier.matches(&row.body_part, &row.impairment_code))
            {
                return Err(TableError::DuplicateVariantRow {
                    body_part: row.body_part.clone(),
                    impairment_code: row.impairment_code.clone(),
                });
            }
        }

        Ok(Self { groups, rows })
    }

    pub fn empty() -> Self {
        Self {
            groups: BTreeSet::new(),
            rows: Vec::new(),
        }
    }

    pub fn has_group(&self, group_number: u16) -> bool {
        self.groups.contains(&group_number)
    }

    pub fn groups(&self) -> impl Iterator<Item = u16> + '_ {
        self.groups.iter().copied()
    }

    pub fn rows(&self) -> &[VariantRecord] {
        &self.rows
    }

    pub fn row(&self, body_part: &str, impairment_code: &str) -> Option<&VariantRecord> {
        self.rows
            .iter()
            .find(|row| row.matches(body_part, impairment_code))
    }
}

/// The low and high variant tables, split by group number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantTables {
    split_group: u16,
    low: VariantTable,
    high: VariantTable,
}

impl VariantTables {
    /// Split threshold of the reference schedule
    pub const REFERENCE_SPLIT: u16 = 310;

    /// Groups below `split_group` live in `low`, the rest in `high`
    pub fn new(split_group: u16, low: VariantTable, high: VariantTable) -> Result<Self, TableError> {
        if let Some(group_number) = low.groups().find(|g| *g >= split_group) {
            return Err(TableError::GroupOnWrongSide {
                group_number,
                split_group,
            });
        }
        if let Some(group_number) = high.groups().find(|g| *g < split_group) {
            return Err(TableError::GroupOnWrongSide {
                group_number,
                split_group,
            });
        }
        Ok(Self {
            split_group,
            low,
            high,
        })
    }

    pub fn split_group(&self) -> u16 {
        self.split_group
    }

    /// Selects the physical table that holds `group_number`
    pub fn table_for(&self, group_number: u16) -> &VariantTable {
        if group_number < self.split_group {
            &self.low
        } else {
            &self.high
        }
    }

    pub fn low(&self) -> &VariantTable {
        &self.low
    }

    pub fn high(&self) -> &VariantTable {
        &self.high
    }
}

/// Keyed row of a bucketed adjustment table
pub trait Bucketed {
    fn bucket_key(&self) -> Decimal;
}

/// A row of the occupational adjustment table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationalAdjustmentRecord {
    pub rating_percent: Decimal,
    /// Ratings for letters c..j in column order
    pub ratings: [Decimal; 8],
}

impl OccupationalAdjustmentRecord {
    pub fn new(rating_percent: Decimal, ratings: [Decimal; 8]) -> Self {
        Self {
            rating_percent,
            ratings,
        }
    }

    pub fn rating_for(&self, letter: VariantLetter) -> Decimal {
        self.ratings[letter.index()]
    }
}

impl Bucketed for OccupationalAdjustmentRecord {
    fn bucket_key(&self) -> Decimal {
        self.rating_percent
    }
}

/// A row of the age adjustment table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeAdjustmentRecord {
    pub wpi_percent: Decimal,
    /// Ratings per age bracket in [`AgeBracket::ALL`] order
    pub ratings: [Decimal; 10],
}

impl AgeAdjustmentRecord {
    pub fn new(wpi_percent: Decimal, ratings: [Decimal; 10]) -> Self {
        Self {
            wpi_percent,
            ratings,
        }
    }

    pub fn rating_for(&self, bracket: AgeBracket) -> Decimal {
        self.ratings[bracket.index()]
    }
}

impl Bucketed for AgeAdjustmentRecord {
    fn bucket_key(&self) -> Decimal {
        self.wpi_percent
    }
}

/// Row counts of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub snapshot_id: SnapshotId,
    pub occupations: usize,
    pub low_variant_rows: usize,
    pub high_variant_rows: usize,
    pub occupational_buckets: usize,
    pub age_buckets: usize,
    pub split_group: u16,
}

/// Immutable snapshot of the four reference tables
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    id: SnapshotId,
    occupations: Vec<OccupationRecord>,
    variants: VariantTables,
    occupational: Vec<OccupationalAdjustmentRecord>,
    age: Vec<AgeAdjustmentRecord>,
}

impl ReferenceTables {
    pub fn new(
        occupations: Vec<OccupationRecord>,
        variants: VariantTables,
        occupational: Vec<OccupationalAdjustmentRecord>,
        age: Vec<AgeAdjustmentRecord>,
    ) -> Result<Self, TableError> {
        Ok(Self {
            id: SnapshotId::new_v7(),
            occupations,
            variants,
            occupational: sorted_buckets("occupational adjustment", occupational)?,
            age: sorted_buckets("age adjustment", age)?,
        })
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn occupations(&self) -> &[OccupationRecord] {
        &self.occupations
    }

    pub fn variants(&self) -> &VariantTables {
        &self.variants
    }

    pub fn occupational(&self) -> &[OccupationalAdjustmentRecord] {
        &self.occupational
    }

    pub fn age(&self) -> &[AgeAdjustmentRecord] {
        &self.age
    }

    /// True when every table has at least one row
    pub fn is_complete(&self) -> bool {
        !self.occupations.is_empty()
            && !(self.variants.low().rows().is_empty() && self.variants.high().rows().is_empty())
            && !self.occupational.is_empty()
            && !self.age.is_empty()
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            snapshot_id: self.id,
            occupations: self.occupations.len(),
            low_variant_rows: self.variants.low().rows().len(),
            high_variant_rows: self.variants.high().rows().len(),
            occupational_buckets: self.occupational.len(),
            age_buckets: self.age.len(),
            split_group: self.variants.split_group(),
        }
    }
}

fn sorted_buckets<T: Bucketed>(table: &'static str, mut rows: Vec<T>) -> Result<Vec<T>, TableError> {
    rows.sort_by_key(|row| row.bucket_key());
    if let Some(pair) = rows
        .windows(2)
        .find(|pair| pair[0].bucket_key() == pair[1].bucket_key())
    {
        return Err(TableError::DuplicateBucket {
            table,
            key: pair[0].bucket_key(),
        });
    }
    Ok(rows)
}
