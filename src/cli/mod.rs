//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `accounts sweep-orphans` - Remove identity users without a profile

pub mod args;

pub use args::{AccountsAction, AccountsArgs, Cli, Commands, ServeArgs};
