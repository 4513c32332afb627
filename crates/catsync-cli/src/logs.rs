//! Operator log commands. These work on the log file alone and never touch
//! the database.

use catsync_core::AppConfig;
use catsync_sync::LogSink;
use clap::Subcommand;

/// Sub-commands available under `log`.
#[derive(Debug, Subcommand)]
pub enum LogCommands {
    /// Print the most recent entries, newest first
    Tail {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Drop entries older than the retention window
    Prune {
        /// Retention in days; defaults to `CATSYNC_LOG_RETENTION_DAYS`
        #[arg(long)]
        days: Option<u32>,
    },
}

pub(crate) async fn run(config: &AppConfig, command: LogCommands) -> anyhow::Result<()> {
    let sink = LogSink::new(&config.log_path, config.log_min_severity);
    match command {
        LogCommands::Tail { limit } => {
            let entries = sink.recent(limit.max(1)).await?;
            if entries.is_empty() {
                println!("log is empty: {}", sink.path().display());
            }
            for entry in entries {
                println!(
                    "[{}] [{}] {}",
                    entry.timestamp.as_deref().unwrap_or("-"),
                    entry.severity,
                    entry.message
                );
            }
        }
        LogCommands::Prune { days } => {
            let days = days.unwrap_or(config.log_retention_days);
            let report = sink.prune(days).await?;
            println!(
                "pruned {}: {} removed, {} kept (retention {days} days)",
                sink.path().display(),
                report.removed,
                report.kept
            );
        }
    }
    Ok(())
}
