use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the page stands with respect to submissions.
///
/// There is no error phase: a failed submission puts the page
/// back where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagePhase {
    /// No result yet and nothing in flight
    Idle,
    /// At least one submission is in flight
    Awaiting,
    /// A result is displayed and nothing is in flight
    Result,
}

/// The most recent failed submission. Kept for diagnostics, never rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastError {
    /// Sequence number of the failed submission
    pub seq: u64,

    /// Rendered error message
    pub message: String,

    /// When the failure was observed
    pub at: DateTime<Utc>,
}

/// What happened to a completed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// The response replaced the displayed result
    Applied,
    /// The response answered an outdated submission and was dropped
    Stale,
    /// The request failed; displayed state is unchanged
    Failed,
}
