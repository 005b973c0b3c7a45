//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Courier - send requests through a rate-limited, retrying, breaker-protected client
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Send requests through a rate-limited, retrying, breaker-protected client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to ~/.config/courier/courier.toml and ./courier.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL, overriding the settings
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Give up after this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a GET request
    Get {
        /// Request arguments
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send a POST request with a JSON body
    Post {
        /// Request arguments
        #[command(flatten)]
        request: RequestArgs,

        /// JSON request body
        #[arg(long)]
        json: String,
    },

    /// Send a DELETE request
    Delete {
        /// Request arguments
        #[command(flatten)]
        request: RequestArgs,
    },
}

/// Arguments shared by every request command
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Path relative to the base URL, or an absolute URL
    pub path: String,

    /// Extra header as `name:value` (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Query pair as `key=value` (repeatable)
    #[arg(short, long)]
    pub query: Vec<String>,

    /// Print response headers
    #[arg(short = 'i', long)]
    pub include_headers: bool,
}
