//! Clap derive structures for the `gocoax` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gocoax -- read status from goCoax MoCA adapters
#[derive(Debug, Parser)]
#[command(
    name = "gocoax",
    version,
    about = "Read link status and PHY rates from goCoax MoCA adapters",
    long_about = "Polls the adapter's built-in web interface and reports identity,\n\
        link state, mesh topology, PHY rates and packet counters.\n\n\
        Works with MA2500D/MA2500C/WF-803M and the Frontier-branded variants.",
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
    /// Adapter profile to use
    #[arg(long, short = 'p', env = "GOCOAX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Adapter address: IP, hostname or URL (overrides profile)
    #[arg(long, short = 'H', env = "GOCOAX_HOST", global = true)]
    pub host: Option<String>,

    /// Web interface username (overrides profile)
    #[arg(long, short = 'u', env = "GOCOAX_USERNAME", global = true)]
    pub username: Option<String>,

    /// Whole-poll timeout in seconds (10-300)
    #[arg(
        long,
        env = "GOCOAX_TIMEOUT",
        global = true,
        value_parser = clap::value_parser!(u64).range(10..=300)
    )]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GOCOAX_OUTPUT",
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
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Field table plus topology (default, interactive)
    Table,
    /// Pretty-printed JSON report
    Json,
    /// Compact single-line JSON report
    JsonCompact,
    /// YAML report
    Yaml,
    /// Flat status document (mac, ip, packets, network, link_phy_rates)
    Document,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Poll the adapter once and print its status
    #[command(alias = "s")]
    Status(StatusArgs),

    /// Poll repeatedly, one JSON line per poll
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Verify the adapter is reachable and accepts the credentials
    Check,

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Blank MAC addresses, for sharing diagnostics
    #[arg(long)]
    pub redact: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls (10-300, default from config or 30)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(10..=300))]
    pub interval: Option<u64>,

    /// Blank MAC addresses, for sharing diagnostics
    #[arg(long)]
    pub redact: bool,

    /// Stop after this many polls
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the resolved profile (password redacted)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
