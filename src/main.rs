//! Command-line client for the Blaze betting site
//!
//! # Usage
//!
//! ```bash
//! blaze-client login
//! blaze-client watch double --verbose
//! blaze-client recent crash
//! blaze-client bet double --color vermelho --amount 2.5
//! ```
//!
//! Settings come from the `--config` file (or the platform default path),
//! overridden by `BLAZE_*` environment variables.

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blaze_client::{config::ConfigLoader, utils::version};
use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match ConfigLoader::new().load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration. Error: {}", e);
            std::process::exit(2);
        }
    };

    let verbose = cli.verbose || settings.logging.verbose;
    let default_level = if verbose {
        "debug".to_string()
    } else {
        settings.logging.level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting {}", version::version_banner());

    if let Err(e) = cli::commands::run(cli, settings).await {
        eprintln!("Command failed. Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
