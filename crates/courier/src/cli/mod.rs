//! Command-line interface.
//!
//! This module provides the CLI structure and command handlers for the courier binary.

mod commands;
mod request;

pub use commands::{Cli, Commands, RequestArgs};
pub use request::{build_client, request_args, run_request};
