//! Discovery module: the dispatch-then-poll orchestration
//!
//! This module contains:
//! - The session state machine
//! - The polling coordinator with deadline and cancellation handling
//! - Session reports and terminal errors

mod coordinator;
mod state;

pub use crate::config::MatchMode;
pub use coordinator::{
    DiscoveryError, DiscoveryOutcome, DiscoveryReport, PollStats, PollingCoordinator,
    PollingSettings,
};
pub use state::{InvalidTransition, SessionState};
