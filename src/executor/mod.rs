//! Request executor
//!
//! Repeats an `Action` against the game server, running auto-recovery
//! before each pass and stopping early once the session's conditions are
//! met. The outside world is reached only through the collaborator traits.

pub mod action;
pub mod collaborators;
pub mod context;
pub mod mock;
pub mod request_executor;

pub use action::{Action, ActionClass, Adventure, GenericAction, SkillCast};
pub use collaborators::{
    LogNotifier, NoOpRefresher, Notifier, RecoveryProcedure, Severity, StatusRefresher, Transport,
};
pub use context::{AbortSignal, Continuation, IterationContext};
pub use request_executor::{ExecutorSettings, RequestExecutor};
