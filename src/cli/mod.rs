//! CLI module for loathing - command-line interface and subcommands.
//!
//! Offline tools over the session engine: response parsing, merchant
//! tables and purchase quotes.

pub mod commands;

pub use commands::Cli;
