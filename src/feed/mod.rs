//! Results feed module
//!
//! This module turns the external results feed into typed candidates:
//! - Fetching full CSV snapshots over HTTP
//! - Flattening wrapped cells and mapping configured columns
//! - Rejecting malformed rows without failing the snapshot

mod record;
mod store;

pub use record::{flatten_cell, CandidateRecord, OperatingHours, RowParseError};
pub use store::{parse_snapshot, HttpResultStore, ResultStore, Snapshot, SourceUnavailable};
