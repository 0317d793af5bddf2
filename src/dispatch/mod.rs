//! Dispatch module for starting external scrape jobs
//!
//! This module contains:
//! - Deterministic job URL encoding of (business type, origin)
//! - Registration of jobs in the append-only pending-work feed
//! - Best-effort triggering of the external worker

mod dispatcher;
mod job;

pub use dispatcher::{DispatchError, Dispatcher, HttpDispatcher};
pub use job::{build_job_url, ScrapeJob};
