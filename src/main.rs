//! Mentora - AI learning assistant CLI
//!
//! Main entry point for the Mentora application.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mentora::cli::{Cli, Commands};
use mentora::commands;
use mentora::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load and validate configuration
    let config = Config::load(&cli.config)?;
    config.validate()?;

    // Execute command
    match cli.command {
        command @ Commands::Ask { .. } => {
            tracing::debug!("Running ask command");
            commands::ask::handle_ask(&config, command).await?;
        }
        Commands::History { command } => {
            tracing::debug!("Running history command");
            commands::history::handle_history(&config, command).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "mentora=debug" } else { "mentora=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
