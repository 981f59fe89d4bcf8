//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for envelopes and listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable output
    #[default]
    Pretty,
    /// JSON output
    Json,
}

/// CLI arguments for openlink
#[derive(Parser, Debug)]
#[command(name = "openlink")]
#[command(author, version, about = "Sandboxed local tool execution engine")]
#[command(long_about = r#"
openlink runs file, search, command, edit and web tools on behalf of a remote
agent, confined to a single root directory.

Configuration is merged from (highest priority first):
1. --dir / --port / --timeout flags
2. OPENLINK_* environment variables (OPENLINK_ENGINE__PORT=8080)
3. --config <path>     Explicit config file
4. ./openlink.toml     Project-level config
5. ~/.config/openlink/config.toml   Global config

Example:
  openlink tools
  openlink exec read_file --args '{"path": "src/main.rs"}'
  openlink --dir ~/work stdio
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Sandbox root directory (default: current directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Port advertised to the transport layer
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Per-call timeout in seconds
    #[arg(short, long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the available tools and their parameters
    Tools,

    /// Run a single tool call
    Exec {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long, value_name = "JSON")]
        args: Option<String>,

        /// Why the call is made (recorded in logs)
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Read JSON tool calls from stdin, one per line, and answer each on stdout
    Stdio,

    /// Show the effective configuration and its sources
    Config,
}
