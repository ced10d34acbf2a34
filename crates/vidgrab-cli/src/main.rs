//! CLI entry point - the composition root.
//!
//! Parses arguments, installs the tracing subscriber, bootstraps the
//! context, and dispatches to a handler.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use vidgrab_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // `paths` must work even when the settings file is broken.
    if matches!(command, Commands::Paths) {
        return handlers::paths::execute();
    }

    let config = CliConfig::load()?.with_proxy_override(cli.proxy);
    let ctx = bootstrap(config)?;

    match command {
        Commands::Download(args) => handlers::download::execute(&ctx, args).await,
        Commands::Info { url } => handlers::info::execute(&ctx, &url).await,
        Commands::Formats { url } => handlers::formats::execute(&ctx, &url).await,
        Commands::Analyze { url } => handlers::analyze::execute(&ctx, &url),
        Commands::History { limit, json } => handlers::history::execute(&ctx, limit, json),
        Commands::Paths => handlers::paths::execute(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
