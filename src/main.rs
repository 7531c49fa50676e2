//! Plugboard - reference host for the package registry.
//!
//! Installs the built-in `core` package, applies the configured activation
//! lists and drives the registry lifecycle from the command line.

mod cli;
mod demo;
mod host;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use plugboard_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use plugboard_core::Registry;

use crate::cli::{Cli, Commands};

fn init_tracing(logging: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.is_json() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = ConfigLoader::expand_path(&cli.config.to_string_lossy());
    ConfigLoader::load_or_default(Path::new(&path))
        .with_context(|| format!("Failed to load config from {}", path))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging);

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    for e in &validation.errors {
        error!("Config {}: {}", e.path, e.message);
    }
    validation.into_result()?;

    match cli.command {
        None => run(&config, "help").await,
        Some(Commands::Run { command }) => run(&config, &command).await,
        Some(Commands::List) => list().await,
    }
}

/// Start the registry, run one chat command line and stop again.
async fn run(config: &Config, line: &str) -> anyhow::Result<()> {
    info!("Starting Plugboard v{}", env!("CARGO_PKG_VERSION"));

    let registry = Registry::new();
    registry.add_packages([demo::core_package()]).await?;
    registry.start().await.context("Failed to start registry")?;

    let outcome = session(&registry, config, line).await;

    registry.stop().await.context("Failed to stop registry")?;
    outcome
}

async fn session(registry: &Registry, config: &Config, line: &str) -> anyhow::Result<()> {
    host::apply_activation(registry, config)
        .await
        .context("Failed to apply activation lists")?;

    if let Some(reply) = host::run_chat_command(registry, line).await? {
        println!("{}", reply);
    }
    host::print_context(registry).await;
    Ok(())
}

async fn list() -> anyhow::Result<()> {
    let registry = Registry::new();
    registry.add_packages([demo::core_package()]).await?;
    host::print_listing(&registry);
    Ok(())
}
