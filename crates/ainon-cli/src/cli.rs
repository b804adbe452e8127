//! Clap CLI definitions for Ainon.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ainon records agent actions as durable facts in two stores: a per-wallet
/// memory timeline and a semantic knowledge index.
#[derive(Parser)]
#[command(
    name = "ainon",
    version,
    about = "Record agent actions to memory and knowledge stores"
)]
pub struct Cli {
    /// Path to config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an agent action in both configured stores.
    ///
    /// Exit codes: 0 both writes ok, 1 invalid arguments, 2 one side failed
    /// after retries, 3 both sides failed.
    Record {
        /// Wallet the action was performed on behalf of.
        wallet: String,
        /// What was done, e.g. "swap" or "stake".
        action: String,
        /// Decision strategy that produced the action.
        strategy: String,
        /// Quantity involved, as a non-negative decimal.
        amount: String,
    },
    /// Show a wallet's recent memory timeline.
    Timeline {
        /// Wallet to inspect.
        wallet: String,
        /// Maximum entries to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Search the knowledge index by content.
    Search {
        /// Content to look for.
        query: String,
        /// Maximum hits to show.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}
