//! CLI command implementations

pub mod clear;
pub mod delete;
pub mod entry;
pub mod gc;

pub use clear::execute as clear;
pub use delete::execute as delete;
pub use entry::{get, has, path, set};
pub use gc::execute as gc;

use crate::adaptor::FileAdaptor;
use crate::cache::Cache;
use crate::config::Config;
use crate::error::CacheResult;
use serde_json::Value;

/// Open the configured cache
pub(crate) async fn open_cache(config: &Config) -> CacheResult<Cache> {
    let adaptor = FileAdaptor::new(&config.storage.root, config.storage.hash_depth).await?;
    Cache::new(Box::new(adaptor), &config.policy)
}

/// Parse a command-line value: JSON if it parses, a bare string otherwise
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Print a value: strings bare, everything else as JSON
pub(crate) fn print_value(value: &Value) {
    match value {
        Value::String(s) => println!("{s}"),
        other => println!("{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_values_parse_as_json() {
        assert_eq!(parse_value("42"), Value::from(42));
        assert_eq!(parse_value("[1,2]"), serde_json::json!([1, 2]));
        assert_eq!(parse_value("\"quoted\""), Value::from("quoted"));
    }

    #[test]
    fn bare_strings_fall_back() {
        assert_eq!(parse_value("hello world"), Value::from("hello world"));
    }
}
