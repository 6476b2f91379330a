//! CLI parse: clap types for Memoflow. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Memoflow CLI - turn voice-note conversations into note documents
#[derive(Parser)]
#[command(name = "memoflow")]
#[command(about = "Plan, write, and refine notes from a conversation transcript")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full workflow: plan, refine each file, print the results
    Run {
        /// Transcript file: JSON array of {role, content} messages
        #[arg(long)]
        transcript: PathBuf,
        /// Current notes file: JSON array of {id, name, content}
        #[arg(long)]
        notes: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Wall-clock budget in seconds (overrides workflow.timeout_secs)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Run only planning (with retries and fallback) and print the plan as JSON
    Plan {
        /// Transcript file: JSON array of {role, content} messages
        #[arg(long)]
        transcript: PathBuf,
        /// Current notes file: JSON array of {id, name, content}
        #[arg(long)]
        notes: Option<PathBuf>,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the merged configuration
    Validate,
    /// Print the merged configuration as TOML (API keys redacted)
    Show,
}
