//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// PetVac API - pet vaccination records backend
#[derive(Parser, Debug)]
#[command(name = "petvac-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Account maintenance
    Accounts(AccountsArgs),
}

/// Arguments for the serve command
///
/// Both fall back to `SERVER_HOST` / `SERVER_PORT` from the loaded config.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the accounts command
#[derive(Parser, Debug)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub action: AccountsAction,
}

/// Account maintenance actions
#[derive(Subcommand, Debug)]
pub enum AccountsAction {
    /// Delete identity users that have no profile in either table
    SweepOrphans {
        /// Report orphans without deleting them
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sweep_dry_run() {
        let cli = Cli::try_parse_from(["petvac-api", "accounts", "sweep-orphans", "--dry-run"])
            .unwrap();
        match cli.command {
            Commands::Accounts(AccountsArgs {
                action: AccountsAction::SweepOrphans { dry_run },
            }) => assert!(dry_run),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["petvac-api", "-v", "serve", "--port", "8080"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
