//! CLI module.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// CDP Assistant - answers questions about Segment, mParticle, Lytics and Zeotap
///
/// Retrieves relevant documentation and streams a grounded answer from the
/// language model.
#[derive(Parser, Debug)]
#[command(name = "cdp-assistant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP chat server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long, env = "CDP_ASSISTANT_HOST")]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "CDP_ASSISTANT_PORT")]
        port: Option<u16>,
    },

    /// Ask a single question and stream the answer
    Ask {
        /// The question to ask
        question: String,
    },

    /// Start an interactive chat session
    Chat,

    /// Show the documentation chunks retrieved for a query
    Search {
        /// Search query
        query: String,

        /// Number of chunks to show
        #[arg(short, long, default_value = "3")]
        k: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
