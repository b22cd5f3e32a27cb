use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = config::CliConfig::load(&cli.config)?;
    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(config = %cli.config.display(), "loaded configuration");
    commands::run_command(cli, &config)
}
