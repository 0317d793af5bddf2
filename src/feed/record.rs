//! Typed candidate records built from loosely-typed feed rows
//!
//! A row is a header-to-cell map. Only the coordinate cell is mandatory;
//! every other interpreted field degrades to `None` when absent or malformed.

use crate::config::ColumnMapping;
use crate::geo::{Coordinate, Located};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a single feed row was rejected
///
/// Never escapes the feed module; rejected rows are counted and skipped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowParseError {
    #[error("row has no '{column}' value")]
    MissingCoordinates { column: String },

    #[error("malformed coordinates '{value}': {reason}")]
    MalformedCoordinates { value: String, reason: String },

    #[error("unreadable CSV record: {0}")]
    Csv(String),
}

/// Operating hours as published by the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperatingHours {
    /// A keyed object such as `{"monday": "9 AM-5 PM"}`
    Structured(Map<String, Value>),

    /// Anything else, kept as text
    FreeText(String),
}

impl OperatingHours {
    fn parse(cell: &str) -> Self {
        match serde_json::from_str::<Value>(cell) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::FreeText(cell.to_string()),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

/// One business from the results feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecord {
    pub coordinates: Coordinate,
    pub title: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub thumbnail_url: Option<String>,
    pub operating_hours: Option<OperatingHours>,

    /// Job URL the producing scrape was dispatched with
    pub job_url: Option<String>,
    pub status: Option<String>,

    /// Every column of the source row, verbatim after cell flattening
    pub fields: BTreeMap<String, String>,

    /// Relevance in [0, 1], attached by the scorer
    pub score_normalized: Option<f64>,
}

impl Located for CandidateRecord {
    fn coordinates(&self) -> Coordinate {
        self.coordinates
    }
}

impl CandidateRecord {
    /// Builds a record from a header-to-cell map
    pub fn from_row(
        row: BTreeMap<String, String>,
        columns: &ColumnMapping,
    ) -> Result<Self, RowParseError> {
        let coordinates = parse_coordinates(&row, &columns.coordinates)?;
        let text = |column: &str| non_blank(&row, column).map(str::to_string);

        Ok(Self {
            coordinates,
            title: text(&columns.title),
            address: text(&columns.address),
            rating: non_blank(&row, &columns.rating).and_then(parse_rating),
            review_count: non_blank(&row, &columns.reviews).and_then(parse_review_count),
            thumbnail_url: text(&columns.thumbnail),
            operating_hours: non_blank(&row, &columns.hours).map(OperatingHours::parse),
            job_url: text(&columns.job_url),
            status: text(&columns.status),
            fields: row,
            score_normalized: None,
        })
    }

    /// True when this row belongs to `job_url` and reports a completed status
    ///
    /// Rows without a status cell count as complete once they carry the job URL.
    pub fn completes_job(&self, job_url: &str, completed_statuses: &[String]) -> bool {
        if self.job_url.as_deref() != Some(job_url) {
            return false;
        }
        match &self.status {
            None => true,
            Some(status) => completed_statuses
                .iter()
                .any(|done| done.eq_ignore_ascii_case(status)),
        }
    }
}

/// Flattens a raw cell
///
/// Cells holding a JSON object with a `"URL"` key become that URL; other
/// cells are trimmed.
pub fn flatten_cell(cell: &str) -> String {
    let trimmed = cell.trim();
    if trimmed.starts_with("{\"") && trimmed.ends_with('}') {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
            if let Some(url) = map.get("URL") {
                return url.as_str().unwrap_or_default().to_string();
            }
        }
    }
    trimmed.to_string()
}

fn non_blank<'a>(row: &'a BTreeMap<String, String>, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_coordinates(
    row: &BTreeMap<String, String>,
    column: &str,
) -> Result<Coordinate, RowParseError> {
    let cell = non_blank(row, column).ok_or_else(|| RowParseError::MissingCoordinates {
        column: column.to_string(),
    })?;
    serde_json::from_str::<Coordinate>(cell).map_err(|e| RowParseError::MalformedCoordinates {
        value: cell.to_string(),
        reason: e.to_string(),
    })
}

fn parse_rating(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|r| r.is_finite())
}

/// Parses review counts such as `"1,234"`
fn parse_review_count(cell: &str) -> Option<u64> {
    cell.replace(',', "").parse::<u64>().ok()
}
