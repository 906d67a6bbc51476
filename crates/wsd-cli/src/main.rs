#![allow(clippy::missing_errors_doc)]

use anyhow::Context;
use clap::Parser;
use wsd_db::error::LockError;
use wsd_engine::EngineError;

mod cli;
mod commands;
mod context;
mod output;

/// Exit status when another holder has a live lease.
const EXIT_CONFLICT: i32 = 3;
/// Exit status when the caller's lease is gone.
const EXIT_NOT_HOLDER: i32 = 4;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("wsd error: {error:#}");
        std::process::exit(exit_code(&error));
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = wsd_config::WsdConfig::load_with_dotenv().context("failed to load wsd configuration")?;
    let ctx = context::AppContext::init(config, flags.db.as_deref()).await?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("WSD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn lock_error(error: &anyhow::Error) -> Option<&LockError> {
    error.chain().find_map(|cause| {
        cause.downcast_ref::<LockError>().or_else(|| match cause.downcast_ref::<EngineError>() {
            Some(EngineError::Lock(lock)) => Some(lock),
            _ => None,
        })
    })
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match lock_error(error) {
        Some(LockError::Conflict { .. }) => EXIT_CONFLICT,
        Some(LockError::NotHolder { .. }) => EXIT_NOT_HOLDER,
        _ => 1,
    }
}
