//! Accounts command - Offline account maintenance.

use crate::cli::args::{AccountsAction, AccountsArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::services::{Services, SweepReport};

/// Execute the accounts command
pub async fn execute(args: AccountsArgs, config: Config) -> AppResult<()> {
    let services = Services::from_config(&config)?;

    match args.action {
        AccountsAction::SweepOrphans { dry_run } => {
            tracing::info!(dry_run, "Sweeping orphaned identity users");
            let report = services.sweeper().sweep(dry_run).await?;
            print_report(&report)?;
            if report.failed > 0 {
                return Err(AppError::internal(format!(
                    "{} orphaned users could not be deleted",
                    report.failed
                )));
            }
        }
    }

    Ok(())
}

fn print_report(report: &SweepReport) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(report)
        .map_err(|e| AppError::internal(format!("Failed to render report: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
