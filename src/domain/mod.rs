//! Domain types for the session engine
//!
//! - AdventureResult: typed quantity deltas parsed from responses
//! - Character: levels, inventory and the state that gates merchants
//! - Request/Response: what crosses the transport boundary
//! - RunOutcome/RunReport: how a run of repeated requests ended

pub mod action;
pub mod character;
pub mod outcome;
pub mod result;

pub use action::{Request, Response};
pub use character::{Character, ResourceSnapshot, SignType};
pub use outcome::{RunOutcome, RunReport};
pub use result::{
    ADV, AdventureResult, DRUNK, FULLSTATS, HP, MEAT, MP, Quantity, ResultKind, SUBSTATS, merge_into,
};
