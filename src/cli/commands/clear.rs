//! Clear command - discard the whole cache

use crate::cli::args::ClearArgs;
use crate::cli::commands::open_cache;
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use console::style;
use std::io::{self, Write};

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> CacheResult<()> {
    if !args.yes {
        print!(
            "Clear the entire cache at {}? [y/N] ",
            config.storage.root.display()
        );
        io::stdout()
            .flush()
            .map_err(|e| CacheError::io("flushing prompt", e))?;

        let mut answer = String::new();
        io::stdin()
            .read_line(&mut answer)
            .map_err(|e| CacheError::io("reading confirmation", e))?;

        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let cache = open_cache(config).await?;
    if cache.clear().await {
        println!("{}", style("Cache cleared").green());
        println!("Retired generation will be reclaimed by the next gc run.");
        Ok(())
    } else {
        Err(CacheError::OperationFailed(
            "clear failed (cache root missing or not writable)".to_string(),
        ))
    }
}
