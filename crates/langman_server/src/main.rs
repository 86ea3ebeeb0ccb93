//! Langman - CLI entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use langman_server::{AppConfig, GameService, init_db, router};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = load_config(&cli)?;

    match cli.command {
        Command::Serve { port, host } => run_http_server(config, host, port).await,
        Command::InitDb { csv } => run_init_db(config, csv),
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,langman_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[instrument(skip(cli), fields(config_path = %cli.config.display(), env = %cli.env))]
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_file(&cli.config, &cli.env)?;

    if let Some(usage_db) = &cli.usage_db {
        info!(%usage_db, "Overriding usage database");
        config = config.with_usage_db(usage_db.clone());
    }
    if let Some(games_db) = &cli.games_db {
        info!(%games_db, "Overriding games database");
        config = config.with_games_db(games_db.clone());
    }

    Ok(config)
}

/// Run the REST server
#[instrument(skip(config))]
async fn run_http_server(config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.host().clone());
    let port = port.unwrap_or(*config.port());

    let service = GameService::from_config(&config)?;
    let app = router(service);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Server ready at http://{}:{}/api/games", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize schemas and seed the corpus
#[instrument(skip(config), fields(csv = %csv.display()))]
fn run_init_db(config: AppConfig, csv: std::path::PathBuf) -> Result<()> {
    let added = init_db(&config, &csv)?;
    info!(added, "Database initialized");
    Ok(())
}
