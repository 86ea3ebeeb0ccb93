//! Command-line interface for langman.

use clap::{Parser, Subcommand};

/// Langman - word guessing game server
#[derive(Parser, Debug)]
#[command(name = "langman")]
#[command(about = "REST backend for the langman word game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, env = "LANGMAN_CONFIG", default_value = "langman.toml")]
    pub config: std::path::PathBuf,

    /// Configuration environment to load
    #[arg(long, global = true, env = "LANGMAN_ENV", default_value = "development")]
    pub env: String,

    /// Override the usage database path
    #[arg(long, global = true, env = "LANGMAN_USAGE_DB")]
    pub usage_db: Option<String>,

    /// Override the games database path
    #[arg(long, global = true, env = "LANGMAN_GAMES_DB")]
    pub games_db: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Create both schemas and seed the usage corpus
    InitDb {
        /// CSV file with usage examples
        #[arg(long, default_value = "data/usages.csv")]
        csv: std::path::PathBuf,
    },
}
