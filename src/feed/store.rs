//! Read-only access to the shared results feed
//!
//! Every call to [`ResultStore::snapshot`] re-fetches the whole feed. There is
//! no caching and no delta tracking.

use crate::config::{ColumnMapping, ResultsFeedConfig};
use crate::feed::record::{flatten_cell, CandidateRecord, RowParseError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::BTreeMap;
use thiserror::Error;

/// A snapshot fetch failed
///
/// Transient from the polling loop's point of view.
#[derive(Debug, Error)]
pub enum SourceUnavailable {
    #[error("request to results feed failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("results feed returned HTTP {0}")]
    Status(u16),

    #[error("results feed is not readable CSV: {0}")]
    Parse(String),

    #[error("snapshot did not complete before the deadline")]
    Deadline,
}

/// One full read of the results feed
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<CandidateRecord>,

    /// Rows rejected with a [`RowParseError`]
    pub skipped_rows: usize,

    pub fetched_at: DateTime<Utc>,
}

/// Source of results-feed snapshots
///
/// Implementations hold no per-session state and are shared across
/// concurrent discovery sessions.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot, SourceUnavailable>;
}

/// [`ResultStore`] over a CSV export reachable with a plain GET
#[derive(Debug, Clone)]
pub struct HttpResultStore {
    client: Client,
    url: String,
    columns: ColumnMapping,
}

impl HttpResultStore {
    pub fn new(client: Client, config: &ResultsFeedConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            columns: config.columns.clone(),
        }
    }
}

#[async_trait]
impl ResultStore for HttpResultStore {
    async fn snapshot(&self) -> Result<Snapshot, SourceUnavailable> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceUnavailable::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let snapshot = parse_snapshot(&body, &self.columns)?;

        tracing::debug!(
            "Fetched results feed: {} rows kept, {} skipped",
            snapshot.records.len(),
            snapshot.skipped_rows
        );

        Ok(snapshot)
    }
}

/// Parses a CSV body into a snapshot
///
/// A malformed header fails the whole snapshot; a malformed row is skipped.
pub fn parse_snapshot(
    body: &[u8],
    columns: &ColumnMapping,
) -> Result<Snapshot, SourceUnavailable> {
    let text = std::str::from_utf8(body)
        .map_err(|e| SourceUnavailable::Parse(format!("body is not UTF-8: {}", e)))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SourceUnavailable::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    // A body without the coordinate column is not the results feed (e.g. a
    // sign-in or error page served with 200)
    if !headers.iter().any(|h| h == &columns.coordinates) {
        return Err(SourceUnavailable::Parse(format!(
            "header has no '{}' column",
            columns.coordinates
        )));
    }

    let mut records = Vec::new();
    let mut skipped_rows = 0;

    for (index, result) in reader.records().enumerate() {
        let parsed = result
            .map_err(|e| RowParseError::Csv(e.to_string()))
            .and_then(|record| {
                let row: BTreeMap<String, String> = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(header, cell)| (header.clone(), flatten_cell(cell)))
                    .collect();
                CandidateRecord::from_row(row, columns)
            });

        match parsed {
            Ok(candidate) => records.push(candidate),
            Err(e) => {
                tracing::debug!("Skipping results row {}: {}", index + 1, e);
                skipped_rows += 1;
            }
        }
    }

    Ok(Snapshot {
        records,
        skipped_rows,
        fetched_at: Utc::now(),
    })
}
