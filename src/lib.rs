//! Loathing - session engine for a text-adventure automation client
//!
//! Drives repeated request/response cycles against the game server, turns
//! free-text responses into typed results, tracks progress toward goals,
//! and buys from token merchants through one data-driven protocol.

pub mod coinmaster;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod parser;
pub mod recovery;
pub mod session;

pub use error::{Result, SessionError};
