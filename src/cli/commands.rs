//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - parse: parse a saved response page
//! - merchants: list the known merchants
//! - quote: price a purchase without sending it
//! - config: print the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Loathing - session engine for a text-adventure automation client
#[derive(Parser, Debug)]
#[command(name = "loathing")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a saved response page and print the results found
    Parse {
        /// HTML or text file holding the response
        file: PathBuf,

        /// Print the parse as JSON
        #[arg(long)]
        json: bool,
    },

    /// List merchants and what they sell
    Merchants,

    /// Show the request and post-condition of a purchase
    Quote {
        /// Merchant name
        merchant: String,

        /// Item id in the merchant's table
        item_id: u32,

        /// Number of items to buy
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,

        /// Saved merchant page to read the token balance from
        #[arg(short, long)]
        balance: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}
