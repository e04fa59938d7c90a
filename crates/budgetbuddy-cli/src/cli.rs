//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// BudgetBuddy - Track expenses, keep budgets honest
#[derive(Parser)]
#[command(name = "budgetbuddy")]
#[command(about = "Self-hosted personal finance app with an AI planning assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "budgetbuddy.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set BUDGETBUDDY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show database status (encryption, size, row counts)
    Status,

    /// Delete all data (users, expenses, budgets, plans) but keep the schema
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a demo user with sample expenses and budgets
    Seed {
        /// Email for the demo account
        #[arg(long, default_value = "demo@budgetbuddy.local")]
        email: String,

        /// Password for the demo account
        #[arg(long, default_value = "password123")]
        password: String,
    },
}
