//! Run outcome types.
//!
//! This module defines the terminal classification of an executor run.

/// Outcome of a run of repeated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Goals met before the iterations were exhausted
    EarlyStop,
    /// Iterations exhausted with goals outstanding - success with a caveat
    Partial,
    /// Iterations exhausted with no outstanding goals
    Complete,
    /// Explicit abort or a refused safety confirmation
    Cancelled,
    /// A fatal fault ended the run
    Errored(String),
}

impl RunOutcome {
    /// Returns true for the outcomes reported to the user as success
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RunOutcome::EarlyStop | RunOutcome::Partial | RunOutcome::Complete
        )
    }
}

/// Summary handed back to the caller once a run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub requested: u32,
    pub completed: u32,
}
