//! Delete command - remove a single entry

use crate::cli::args::DeleteArgs;
use crate::cli::commands::open_cache;
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use console::style;

/// Execute the delete command
pub async fn execute(args: DeleteArgs, config: &Config) -> CacheResult<()> {
    let cache = open_cache(config).await?;

    if cache.delete(&args.key).await? {
        println!("{} {}", style("Deleted").green(), args.key);
        Ok(())
    } else {
        Err(CacheError::OperationFailed(format!(
            "delete failed for {} (missing entry or lock contention)",
            args.key
        )))
    }
}
