//! Larder - cache maintenance CLI
//!
//! Entry point that dispatches to subcommands.

use clap::{CommandFactory, Parser};
use console::style;
use larder::cli::{Cli, Commands};
use larder::config::Config;
use larder::error::CacheResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("larder=warn"),
        1 => EnvFilter::new("larder=info"),
        _ => EnvFilter::new("larder=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Completions don't need config loading
    if let Commands::Completions(args) = cli.command {
        clap_complete::generate(
            args.shell,
            &mut Cli::command(),
            "larder",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    // Load configuration, then apply command-line overrides
    let mut config = Config::load(cli.config.as_deref()).await?;
    if let Some(root) = cli.root {
        config.storage.root = root;
    }
    if let Some(depth) = cli.depth {
        config.storage.hash_depth = depth;
    }

    // Dispatch to command
    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Get(args) => larder::cli::commands::get(args, &config).await,
        Commands::Set(args) => larder::cli::commands::set(args, &config).await,
        Commands::Delete(args) => larder::cli::commands::delete(args, &config).await,
        Commands::Has(args) => larder::cli::commands::has(args, &config).await,
        Commands::Path(args) => larder::cli::commands::path(args, &config).await,
        Commands::Clear(args) => larder::cli::commands::clear(args, &config).await,
        Commands::Gc(args) => larder::cli::commands::gc(args, &config).await,
    }
}
