//! Gc command - run the garbage collection sweeps

use crate::cli::args::GcArgs;
use crate::cli::commands::open_cache;
use crate::config::Config;
use crate::error::CacheResult;

/// Execute the gc command
pub async fn execute(args: GcArgs, config: &Config) -> CacheResult<()> {
    let cache = open_cache(config).await?;
    let stats = cache.garbage_collect().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Expired files removed:    {}", stats.expired_files);
        println!("Empty directories pruned: {}", stats.pruned_dirs);
        println!("Retired generations:      {}", stats.retired_generations);
    }
    Ok(())
}
