//! CLI command definitions for the `shelfchat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod history;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with an OpenAI model in the browser or the terminal.
#[derive(Parser)]
#[command(name = "shelfchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web chat UI.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "8501")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Model to use for this session (overrides config.toml).
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Chat in the terminal.
    Chat {
        /// Model to use for this session (overrides config.toml).
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Inspect or delete the persisted chat history.
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Show the persisted messages.
    Show {
        /// Show only the last N messages.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete the chat history.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}
