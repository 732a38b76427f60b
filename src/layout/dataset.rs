//! Raw vote records and their coercion into typed records
//!
//! Numeric columns arrive as strings. A record whose `yes_pct` or `voters`
//! does not coerce is dropped here and reported, so a bad row can never put
//! NaN into the simulation.

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::warn;

/// One row as it appears in a scenario or data file
#[derive(Deserialize, Debug, Clone)]
pub struct RawRecord {
    pub name: String,
    #[serde(deserialize_with = "cell_text")]
    pub yes_pct: String,
    #[serde(deserialize_with = "cell_text")]
    pub voters: String,
    pub category: String,
}

/// YAML cells may be quoted or bare numbers; both are kept as text until coercion
fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Number(f64),
    }

    Ok(match Cell::deserialize(deserializer)? {
        Cell::Text(text) => text,
        Cell::Number(n) => n.to_string(),
    })
}

impl RawRecord {
    pub fn new(name: &str, yes_pct: &str, voters: &str, category: &str) -> Self {
        Self {
            name: name.to_owned(),
            yes_pct: yes_pct.to_owned(),
            voters: voters.to_owned(),
            category: category.to_owned(),
        }
    }
}

/// A row that passed coercion
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub yes_pct: f64,
    pub voters: u64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordIssue {
    #[error("yes_pct `{0}` is not a finite number")]
    YesPct(String),
    #[error("voters `{0}` is not a positive integer")]
    Voters(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub name: String,
    pub issue: RecordIssue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: Vec<Rejected>,
}

fn parse_yes_pct(raw: &str) -> Result<f64, RecordIssue> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordIssue::YesPct(raw.to_owned()))
}

/// Accepts `1234` and integral floats like `1234.0`
fn parse_voters(raw: &str) -> Result<u64, RecordIssue> {
    let trimmed = raw.trim();
    let parsed = trimmed.parse::<u64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0 && *v >= 0.0 && *v <= u64::MAX as f64)
            .map(|v| v as u64)
    });
    parsed.filter(|v| *v > 0).ok_or_else(|| RecordIssue::Voters(raw.to_owned()))
}

impl TryFrom<&RawRecord> for Record {
    type Error = RecordIssue;

    fn try_from(raw: &RawRecord) -> Result<Self, Self::Error> {
        Ok(Record {
            name: raw.name.clone(),
            yes_pct: parse_yes_pct(&raw.yes_pct)?,
            voters: parse_voters(&raw.voters)?,
            category: raw.category.trim().to_owned(),
        })
    }
}

/// Coerce every raw row, keeping input order for the accepted ones
pub fn coerce_records(raw: &[RawRecord]) -> (Vec<Record>, LoadReport) {
    let mut records = Vec::with_capacity(raw.len());
    let mut report = LoadReport::default();

    for row in raw {
        match Record::try_from(row) {
            Ok(record) => records.push(record),
            Err(issue) => {
                warn!(name = %row.name, %issue, "dropping malformed record");
                report.rejected.push(Rejected { name: row.name.clone(), issue });
            }
        }
    }

    report.accepted = records.len();
    (records, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_numeric_strings() {
        let (records, report) = coerce_records(&[RawRecord::new("Bulle", " 58.25 ", "9123", "Urbain")]);
        assert_eq!(report.accepted, 1);
        assert_eq!(records[0].yes_pct, 58.25);
        assert_eq!(records[0].voters, 9123);
    }

    #[test]
    fn integral_float_voters_are_accepted() {
        assert_eq!(parse_voters("812.0"), Ok(812));
        assert!(parse_voters("812.5").is_err());
    }

    #[test]
    fn bare_yaml_numbers_are_read_as_text() {
        let rows: Vec<RawRecord> = serde_yaml::from_str("- { name: Bulle, yes_pct: 58.25, voters: 9123, category: Urbain }").unwrap();
        assert_eq!(rows[0].yes_pct, "58.25");
        assert_eq!(rows[0].voters, "9123");
    }

    #[test]
    fn malformed_rows_are_reported_not_kept() {
        let raw = vec![
            RawRecord::new("Ok", "40", "100", "Rural"),
            RawRecord::new("NoPct", "n/a", "100", "Rural"),
            RawRecord::new("NoVoters", "40", "", "Rural"),
            RawRecord::new("Zero", "40", "0", "Rural"),
            RawRecord::new("Inf", "inf", "10", "Rural"),
        ];
        let (records, report) = coerce_records(&raw);

        assert_eq!(records.len(), 1);
        assert_eq!(report.rejected.len(), 4);
        assert_eq!(report.rejected[0].issue, RecordIssue::YesPct("n/a".into()));
        assert_eq!(report.rejected[2].issue, RecordIssue::Voters("0".into()));
    }
}
