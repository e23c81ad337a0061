//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Larder - filesystem-backed TTL key/value cache
///
/// Inspect and maintain a shared cache directory: read and write
/// entries, clear whole cache generations, and reclaim expired files.
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LARDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides config)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Shard directory depth (overrides config)
    #[arg(short, long, global = true)]
    pub depth: Option<u32>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a cached value
    Get(GetArgs),

    /// Store a value
    Set(SetArgs),

    /// Remove an entry
    Delete(DeleteArgs),

    /// Check whether a fresh entry exists
    Has(HasArgs),

    /// Show the on-disk path for a key
    Path(PathArgs),

    /// Discard every entry at once
    Clear(ClearArgs),

    /// Reclaim expired entries and retired generations
    Gc(GcArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Cache key
    pub key: String,

    /// Value to print on a miss (JSON, or a bare string)
    #[arg(long)]
    pub default: Option<String>,
}

/// Arguments for the set command
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Cache key
    pub key: String,

    /// Value to store (JSON, or a bare string)
    pub value: String,

    /// Time-to-live in seconds (default from config; may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub ttl: Option<i64>,
}

/// Arguments for the delete command
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Cache key
    pub key: String,
}

/// Arguments for the has command
#[derive(Parser, Debug)]
pub struct HasArgs {
    /// Cache key
    pub key: String,
}

/// Arguments for the path command
#[derive(Parser, Debug)]
pub struct PathArgs {
    /// Cache key
    pub key: String,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the gc command
#[derive(Parser, Debug)]
pub struct GcArgs {
    /// Print the sweep counters as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
