//! Clap derive structures for the `dexsync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// dexsync -- offline-first PokeAPI catalog browser
#[derive(Debug, Parser)]
#[command(
    name = "dexsync",
    version,
    about = "Browse the PokeAPI catalog and keep favorites that survive going offline",
    long_about = "Browse the PokeAPI catalog from the command line.\n\n\
        Favorites are stored locally and changes are queued while the catalog\n\
        is unreachable, then reconciled once connectivity returns.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Catalog base URL (overrides config)
    #[arg(long, env = "DEXSYNC_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Directory holding favorites (overrides config)
    #[arg(long, env = "DEXSYNC_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "DEXSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DEXSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the remote catalog
    #[command(alias = "c")]
    Catalog(CatalogArgs),

    /// Manage locally stored favorites
    #[command(alias = "fav", alias = "f")]
    Favorites(FavoritesArgs),

    /// Show connectivity and sync status
    Status,

    /// Monitor connectivity and sync favorites on reconnect
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List catalog entries, one page at a time
    #[command(alias = "ls")]
    List {
        /// Number of pages to fetch
        #[arg(long, short = 'n', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },

    /// Show one catalog entry
    #[command(alias = "get")]
    Show {
        /// Catalog id (e.g. 25)
        id: u32,
    },
}

// ── Favorites ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorites
    #[command(alias = "ls")]
    List,

    /// Mark a catalog entry as favorite
    Add {
        /// Catalog id
        id: u32,

        /// Entry name; looked up in the catalog when omitted
        #[arg(long)]
        name: Option<String>,
    },

    /// Unmark a favorite
    #[command(alias = "rm")]
    Remove {
        /// Catalog id
        id: u32,
    },

    /// Reconcile pending changes if the catalog is reachable
    Sync,

    /// List changes not yet reconciled
    Pending,

    /// Forget all favorites and pending changes
    Clear,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this long (e.g. "90s", "5m"); runs until Ctrl-C otherwise
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Seconds between connectivity checks (overrides config)
    #[arg(long)]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
