//! CLI argument parsing.

use clap::{Parser, Subcommand};

/// Command-line client for taskdeck servers.
#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about = "Talk to a taskdeck server")]
pub struct Cli {
    /// Server base URL.
    #[arg(long, global = true, env = "TASKDECK_URL", default_value = "http://localhost:8080")]
    pub url: String,

    /// Per-call timeout in seconds.
    #[arg(long, global = true, env = "TASKDECK_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Enable debug logging to stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Tool operations.
    #[command(subcommand)]
    Tools(ToolCommands),

    /// Prompt operations.
    #[command(subcommand)]
    Prompts(PromptCommands),

    /// Dispatch one raw JSON intent document and print the result.
    Intent {
        /// The intent, e.g. '{"method":"tools/call","params":{"name":"list_tasks"}}'.
        json: String,
    },

    /// Interactive mode: one JSON intent per line on stdin.
    Repl,
}

/// Tool subcommands.
#[derive(Debug, Subcommand)]
pub enum ToolCommands {
    /// List available tools.
    List,
    /// Call a tool by name.
    Call {
        /// Tool name.
        name: String,
        /// Tool arguments as a JSON object.
        #[arg(long)]
        args: Option<String>,
    },
}

/// Prompt subcommands.
#[derive(Debug, Subcommand)]
pub enum PromptCommands {
    /// List available prompts.
    List,
    /// Fetch a prompt by name.
    Get {
        /// Prompt name.
        name: String,
        /// Prompt arguments as a JSON object.
        #[arg(long)]
        args: Option<String>,
    },
}
