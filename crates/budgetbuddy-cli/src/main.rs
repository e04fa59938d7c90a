//! BudgetBuddy CLI - Personal finance app
//!
//! Usage:
//!   budgetbuddy init                 Initialize database
//!   budgetbuddy seed                 Create a demo user with sample data
//!   budgetbuddy serve --port 3000    Start web server
//!   budgetbuddy status               Show database status

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, static_dir.as_deref()).await,
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Reset { yes } => commands::cmd_reset(&cli.db, yes, cli.no_encrypt),
        Commands::Seed { email, password } => {
            commands::cmd_seed(&cli.db, &email, &password, cli.no_encrypt)
        }
    }
}
