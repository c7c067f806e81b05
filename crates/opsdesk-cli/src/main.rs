//! CLI entry point - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together via
//! bootstrap. Command dispatch routes to handlers which delegate to the
//! conversation store.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use opsdesk_cli::{bootstrap, commands, Cli, Commands, PrintNotifier};
use opsdesk_core::{ChangeNotifier, NoopNotifier};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), opsdesk_cli::CliError> {
    let config = bootstrap::CliConfig::from_env()?;

    // Watch mode prints store changes live; one-shot commands stay quiet.
    let notifier: Arc<dyn ChangeNotifier> = if matches!(cli.command, Commands::Watch) {
        Arc::new(PrintNotifier)
    } else {
        Arc::new(NoopNotifier::new())
    };

    let context = bootstrap::build_context(&config, notifier);
    commands::dispatch(&context, cli.command).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
