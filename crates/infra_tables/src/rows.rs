//! CSV row parsing for each reference table

use std::io::Read;
use std::str::FromStr;

use csv::StringRecord;
use domain_rating::{
    AgeAdjustmentRecord, OccupationRecord, OccupationalAdjustmentRecord, VariantLetter,
    VariantRecord, VariantTable,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::LoadError;

const OCCUPATIONS: &str = "occupations";
const OCCUPATIONAL_ADJUSTMENTS: &str = "occupational adjustments";
const AGE_ADJUSTMENTS: &str = "age adjustment";

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

/// Deserializes every row, keeping the line number for later diagnostics
fn deserialize_rows<R: Read, T: DeserializeOwned>(
    table: &'static str,
    source: R,
) -> Result<Vec<(u64, T)>, LoadError> {
    let mut reader = csv_reader(source);
    let headers = reader.headers().map_err(LoadError::csv(table))?.clone();

    reader
        .records()
        .map(|record| -> Result<(u64, T), LoadError> {
            let record = record.map_err(LoadError::csv(table))?;
            let row = record
                .deserialize(Some(&headers))
                .map_err(LoadError::csv(table))?;
            Ok((line_of(&record), row))
        })
        .collect()
}

fn parse_decimal(table: &'static str, line: u64, column: &str, raw: &str) -> Result<Decimal, LoadError> {
    Decimal::from_str(raw).map_err(|e| LoadError::InvalidValue {
        table,
        line,
        message: format!("{} '{}' is not a number: {}", column, raw, e),
    })
}

fn parse_columns<const N: usize>(
    table: &'static str,
    line: u64,
    cells: [(&str, &str); N],
) -> Result<[Decimal; N], LoadError> {
    let mut values = [Decimal::ZERO; N];
    for (slot, (column, raw)) in values.iter_mut().zip(cells) {
        *slot = parse_decimal(table, line, column, raw)?;
    }
    Ok(values)
}

#[derive(Debug, Deserialize)]
struct OccupationRow {
    group_number: u16,
    #[serde(alias = "title")]
    occupation_title: String,
    #[serde(default)]
    industry: String,
}

/// Reads `group_number, occupation_title, industry` rows
pub fn read_occupations<R: Read>(source: R) -> Result<Vec<OccupationRecord>, LoadError> {
    Ok(deserialize_rows::<_, OccupationRow>(OCCUPATIONS, source)?
        .into_iter()
        .map(|(_, row)| OccupationRecord::new(row.group_number, row.occupation_title, row.industry))
        .collect())
}

#[derive(Debug, Deserialize)]
struct OccupationalRow {
    rating_percent: String,
    c: String,
    d: String,
    e: String,
    f: String,
    g: String,
    h: String,
    i: String,
    j: String,
}

/// Reads `rating_percent, c..j` rows
pub fn read_occupational_adjustments<R: Read>(
    source: R,
) -> Result<Vec<OccupationalAdjustmentRecord>, LoadError> {
    deserialize_rows::<_, OccupationalRow>(OCCUPATIONAL_ADJUSTMENTS, source)?
        .into_iter()
        .map(|(line, row)| -> Result<OccupationalAdjustmentRecord, LoadError> {
            let key = parse_decimal(OCCUPATIONAL_ADJUSTMENTS, line, "rating_percent", &row.rating_percent)?;
            let ratings = parse_columns(
                OCCUPATIONAL_ADJUSTMENTS,
                line,
                [
                    ("c", row.c.as_str()),
                    ("d", row.d.as_str()),
                    ("e", row.e.as_str()),
                    ("f", row.f.as_str()),
                    ("g", row.g.as_str()),
                    ("h", row.h.as_str()),
                    ("i", row.i.as_str()),
                    ("j", row.j.as_str()),
                ],
            )?;
            Ok(OccupationalAdjustmentRecord::new(key, ratings))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct AgeRow {
    wpi_percent: String,
    #[serde(rename = "21_and_under")]
    up_to_21: String,
    #[serde(rename = "22_to_26")]
    from_22: String,
    #[serde(rename = "27_to_31")]
    from_27: String,
    #[serde(rename = "32_to_36")]
    from_32: String,
    #[serde(rename = "37_to_41")]
    from_37: String,
    #[serde(rename = "42_to_46")]
    from_42: String,
    #[serde(rename = "47_to_51")]
    from_47: String,
    #[serde(rename = "52_to_56")]
    from_52: String,
    #[serde(rename = "57_to_61")]
    from_57: String,
    #[serde(rename = "62_and_over")]
    from_62: String,
}

/// Reads `wpi_percent` rows with one column per age bracket
pub fn read_age_adjustments<R: Read>(source: R) -> Result<Vec<AgeAdjustmentRecord>, LoadError> {
    deserialize_rows::<_, AgeRow>(AGE_ADJUSTMENTS, source)?
        .into_iter()
        .map(|(line, row)| -> Result<AgeAdjustmentRecord, LoadError> {
            let key = parse_decimal(AGE_ADJUSTMENTS, line, "wpi_percent", &row.wpi_percent)?;
            let ratings = parse_columns(
                AGE_ADJUSTMENTS,
                line,
                [
                    ("21_and_under", row.up_to_21.as_str()),
                    ("22_to_26", row.from_22.as_str()),
                    ("27_to_31", row.from_27.as_str()),
                    ("32_to_36", row.from_32.as_str()),
                    ("37_to_41", row.from_37.as_str()),
                    ("42_to_46", row.from_42.as_str()),
                    ("47_to_51", row.from_47.as_str()),
                    ("52_to_56", row.from_52.as_str()),
                    ("57_to_61", row.from_57.as_str()),
                    ("62_and_over", row.from_62.as_str()),
                ],
            )?;
            Ok(AgeAdjustmentRecord::new(key, ratings))
        })
        .collect()
}

/// Reads a variant table whose group columns are named `group_<n>`
///
/// Empty cells are left out of the row; any other value must be a single
/// letter c..j.
pub fn read_variant_table<R: Read>(table: &'static str, source: R) -> Result<VariantTable, LoadError> {
    let mut reader = csv_reader(source);
    let headers = reader.headers().map_err(LoadError::csv(table))?.clone();

    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(LoadError::MissingColumn { table, column: name })
    };
    let body_part_column = column("body_part")?;
    let code_column = column("impairment_code")?;

    let group_columns: Vec<(usize, u16)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, header)| {
            header
                .strip_prefix("group_")
                .and_then(|n| n.parse().ok())
                .map(|group| (i, group))
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(LoadError::csv(table))?;
        let line = line_of(&record);

        let body_part = record.get(body_part_column).unwrap_or_default();
        let code = record.get(code_column).unwrap_or_default();
        if body_part.is_empty() {
            return Err(LoadError::InvalidValue {
                table,
                line,
                message: "body_part is empty".to_string(),
            });
        }

        let mut row = VariantRecord::new(body_part, code);
        for (index, group) in &group_columns {
            let cell = record.get(*index).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            let letter = cell
                .parse::<VariantLetter>()
                .map_err(|e| LoadError::InvalidValue {
                    table,
                    line,
                    message: format!("group_{}: {}", group, e),
                })?;
            row = row.with_letter(*group, letter);
        }
        rows.push(row);
    }

    Ok(VariantTable::new(
        group_columns.iter().map(|(_, group)| *group),
        rows,
    )?)
}
