//! Voyage command-line client
//!
//! Drives the account session from a terminal: log in and out, check the
//! stored session, manage the profile, and try out credential checks.

mod cli;
mod commands;

use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    voyage_core::init_logging(default_filter);

    if let Err(err) = commands::dispatch(cli).await {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
