/// Discovery session state definitions
///
/// A session moves `Dispatching -> Polling` and then ends in exactly one
/// terminal state.
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Represents the current state of a discovery session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    // ===== Active States =====
    /// Registering and triggering the scrape job
    Dispatching,

    /// Sampling the results feed until a match or the deadline
    Polling,

    // ===== Terminal States =====
    /// Qualifying candidates were found
    Matched,

    /// The deadline passed with no qualifying candidate
    TimedOut,

    /// Dispatch failed, or no snapshot succeeded before the deadline
    Failed,

    /// The caller withdrew the request
    Cancelled,
}

impl SessionState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Dispatching | Self::Polling)
    }

    /// Returns true if the session ended with candidates
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Matched)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        match self {
            Self::Dispatching => matches!(next, Self::Polling | Self::Failed | Self::Cancelled),
            Self::Polling => next.is_terminal(),
            _ => false,
        }
    }

    /// Returns `next` if the move is legal
    pub fn transition(self, next: SessionState) -> Result<SessionState, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dispatching => "dispatching",
            Self::Polling => "polling",
            Self::Matched => "matched",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all possible session states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Dispatching,
            Self::Polling,
            Self::Matched,
            Self::TimedOut,
            Self::Failed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A state change the session machine does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid session transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub to: SessionState,
}
