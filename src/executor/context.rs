//! Per-run iteration context and the abort signal

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::ResourceSnapshot;
use crate::error::{Result, SessionError};

/// Tri-state progress flag of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    Continuing,
    Cancelled,
    Errored(String),
}

/// Cloneable cancellation flag, checked only at boundaries.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Fails with `Aborted` once the signal is raised
    pub fn check(&self) -> Result<()> {
        if self.is_aborted() {
            return Err(SessionError::Aborted);
        }
        Ok(())
    }
}

/// Transient record of one run.
#[derive(Debug, Clone)]
pub struct IterationContext {
    pub requested: u32,
    pub completed: u32,
    pub continuation: Continuation,
    /// Resource levels after the last pass
    pub snapshot: ResourceSnapshot,
    /// Condition count at the previous boundary check
    pub conditions_seen: usize,
    /// Falling-down confirmation already given for this run
    pub confirmed_impairment: bool,
}

impl IterationContext {
    pub fn new(requested: u32, snapshot: ResourceSnapshot, conditions_seen: usize) -> Self {
        Self {
            requested,
            completed: 0,
            continuation: Continuation::Continuing,
            snapshot,
            conditions_seen,
            confirmed_impairment: false,
        }
    }

    pub fn is_continuing(&self) -> bool {
        self.continuation == Continuation::Continuing
    }

    pub fn has_remaining(&self) -> bool {
        self.completed < self.requested
    }

    pub fn cancel(&mut self) {
        self.continuation = Continuation::Cancelled;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.continuation = Continuation::Errored(message.into());
    }
}
