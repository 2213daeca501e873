use std::path::Path;

use anyhow::Context;
use clap::Parser;
use digest_core::{ApiClient, ClientConfig, FileStore};

mod cli;
mod commands;

fn main() {
    if let Err(error) = run() {
        eprintln!("digest error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    // `.env` may set DIGEST_LOG, so it is read before tracing starts.
    load_dotenv(Path::new(".env"))?;
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = ClientConfig::load().context("failed to load digest configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if cli.token.is_some() {
        config.token.clone_from(&cli.token);
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    tracing::debug!(base_url = %config.base_url, mode = %config.mode, "configuration loaded");

    let client = ApiClient::from_config(&config);
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        cli::Commands::Fetch(args) => commands::fetch(&client, args, &mut stdout),
        cli::Commands::Curl(args) => commands::curl(&client, args, &mut stdout),
        cli::Commands::State { file, action } => {
            commands::state(&FileStore::new(file), action, &mut stdout)
        }
    }
}

/// Load `path` into the environment. A missing file is fine; an unreadable
/// or malformed one is an error.
fn load_dotenv(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    dotenvy::from_path(path)
        .with_context(|| format!("failed to load dotenv file at {}", path.display()))?;
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    // The curl diagnostic logs at info, so development mode shows it by default.
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn,digest_core::diagnostic=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("DIGEST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
