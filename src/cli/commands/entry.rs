//! Entry commands - get, set, has, path

use crate::adaptor::FileAdaptor;
use crate::cli::args::{GetArgs, HasArgs, PathArgs, SetArgs};
use crate::cli::commands::{open_cache, parse_value, print_value};
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use chrono::Duration;
use console::style;
use serde_json::Value;

/// Execute the get command
pub async fn get(args: GetArgs, config: &Config) -> CacheResult<()> {
    let cache = open_cache(config).await?;
    let value: Value = cache.get(&args.key, Value::Null).await?;

    if let Value::Null = value {
        // Null is also what a stored null decodes to, but at the CLI a
        // miss without a fallback is the condition worth reporting.
        return match args.default {
            Some(raw) => {
                print_value(&parse_value(&raw));
                Ok(())
            }
            None => Err(CacheError::KeyNotFound(args.key)),
        };
    }

    print_value(&value);
    Ok(())
}

/// Execute the set command
pub async fn set(args: SetArgs, config: &Config) -> CacheResult<()> {
    let cache = open_cache(config).await?;
    let value = parse_value(&args.value);
    let ttl = args.ttl.map(Duration::seconds);

    if cache.set(&args.key, &value, ttl).await? {
        println!("{} {}", style("Stored").green(), args.key);
        Ok(())
    } else {
        Err(CacheError::OperationFailed(format!(
            "write failed for {} (lock contention or IO error)",
            args.key
        )))
    }
}

/// Execute the has command
pub async fn has(args: HasArgs, config: &Config) -> CacheResult<()> {
    let cache = open_cache(config).await?;
    println!("{}", cache.has(&args.key).await?);
    Ok(())
}

/// Execute the path command
pub async fn path(args: PathArgs, config: &Config) -> CacheResult<()> {
    let adaptor = FileAdaptor::new(&config.storage.root, config.storage.hash_depth).await?;
    println!("{}", adaptor.entry_path(&args.key)?.display());
    Ok(())
}
