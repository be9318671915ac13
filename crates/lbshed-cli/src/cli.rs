//! Clap derive structures for the `lbshed` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Keep this module dependent on clap + clap_complete only -- build.rs
//! includes it directly for man-page generation.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lbshed -- node state control for redundant load-balancer pairs
#[derive(Debug, Parser)]
#[command(
    name = "lbshed",
    version,
    about = "Manage backend-node state behind load-balancer device pairs",
    long_about = "Operational CLI for load-balancer device clusters.\n\n\
        Discovers the active device of a redundant pair, then enables,\n\
        disables, or reports backend nodes -- optionally scoped to a\n\
        management partition, with the prior partition restored afterward.",
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
    /// Environment (device group) to operate on
    #[arg(long, short = 'e', env = "LBSHED_ENVIRONMENT", global = true)]
    pub environment: Option<String>,

    /// Device hosts, comma-separated (overrides the environment's list)
    #[arg(long, env = "LBSHED_HOSTS", global = true)]
    pub hosts: Option<String>,

    /// Management username (overrides the environment's)
    #[arg(long, short = 'u', env = "LBSHED_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LBSHED_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LBSHED_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LBSHED_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Enable, disable, or report backend nodes
    #[command(alias = "node", alias = "n")]
    Nodes(NodesArgs),

    /// Inspect the devices' failover roles
    #[command(alias = "fo")]
    Failover(FailoverArgs),

    /// List management partitions on the active device
    #[command(alias = "part")]
    Partitions(PartitionsArgs),

    /// List configured environments
    #[command(alias = "env")]
    Environments(EnvironmentsArgs),

    /// Manage lbshed configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── nodes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// Enable nodes for new sessions
    Enable {
        /// Node hostnames
        #[arg(required = true)]
        nodes: Vec<String>,

        /// Management partition to operate in (restored afterward)
        #[arg(long, short = 'P')]
        partition: Option<String>,
    },

    /// Disable nodes for new sessions (drains traffic)
    Disable {
        /// Node hostnames
        #[arg(required = true)]
        nodes: Vec<String>,

        /// Management partition to operate in (restored afterward)
        #[arg(long, short = 'P')]
        partition: Option<String>,
    },

    /// Report the session state of nodes
    Status {
        /// Node hostnames
        #[arg(required = true)]
        nodes: Vec<String>,

        /// Management partition to operate in (restored afterward)
        #[arg(long, short = 'P')]
        partition: Option<String>,
    },
}

// ── failover ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FailoverArgs {
    #[command(subcommand)]
    pub command: FailoverCommand,
}

#[derive(Debug, Subcommand)]
pub enum FailoverCommand {
    /// Show every configured device's failover state
    Status,

    /// Print the host of the device currently active
    Active,
}

// ── partitions ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PartitionsArgs {
    #[command(subcommand)]
    pub command: PartitionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PartitionsCommand {
    /// List partitions visible on the active device
    List,
}

// ── environments ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EnvironmentsArgs {
    #[command(subcommand)]
    pub command: EnvironmentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EnvironmentsCommand {
    /// List environments from the configuration file
    List,
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Print the effective configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store an environment's password in the system keyring
    SetPassword {
        /// Environment to store the password for
        #[arg(long, short = 'e')]
        environment: Option<String>,
    },
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
