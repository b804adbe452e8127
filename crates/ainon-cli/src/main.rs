//! Ainon CLI: record agent actions and inspect what was recorded.
//!
//! Backend clients are opened once here and injected into the recorder;
//! nothing in the lower crates holds global state.

mod cli;
mod cmd;
mod config;

use clap::Parser;

use crate::cli::{Cli, Commands};

fn init_tracing_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing_stderr();

    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref());

    let code = match cli.command {
        Commands::Record {
            wallet,
            action,
            strategy,
            amount,
        } => cmd::record::cmd_record(&settings, &wallet, &action, &strategy, &amount).await,
        Commands::Timeline { wallet, limit } => {
            match cmd::query::cmd_timeline(&settings, &wallet, limit).await {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("error: {e}");
                    1
                }
            }
        }
        Commands::Search { query, limit } => {
            match cmd::query::cmd_search(&settings, &query, limit).await {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("error: {e}");
                    1
                }
            }
        }
    };

    std::process::exit(code);
}
