//! Coin Desk command line entry point

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use coin_desk_service::{initialize_logging, load_configuration, Cli, CommandHandler, ServiceState};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY and friends from .env when present
    let dotenv_path = dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(data_dir) = &cli.data_dir {
        config.service.data_dir = data_dir.clone();
    }

    initialize_logging(&config.logging)?;
    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {:?}", path);
    }
    info!("Starting Coin Desk v{}", env!("CARGO_PKG_VERSION"));

    let state = ServiceState::new(config).context("Failed to initialize Coin Desk")?;
    CommandHandler::new(state).handle_command(cli.command).await
}
