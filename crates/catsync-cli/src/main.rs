mod logs;
mod products;
mod settings;

use std::sync::Arc;

use catsync_core::AppConfig;
use catsync_db::{PgCacheStore, PgSettingsStore};
use catsync_sync::SyncContext;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::logs::LogCommands;
use crate::settings::SettingsCommands;

#[derive(Debug, Parser)]
#[command(name = "catsync-cli")]
#[command(about = "Catalog sync command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Refresh the product cache from the source API
    Fetch,
    /// Reconcile cached products into the commerce site
    Import {
        /// Cache offset of the first batch
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Keep importing batches until the cache is exhausted
        #[arg(long)]
        all: bool,
        /// Pause between batches when `--all` is set, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
    /// Re-fetch one product from the source and reconcile it immediately
    Refresh {
        /// Source external id (SKU), e.g. ZC-100
        external_id: String,
    },
    /// Show or change the omit-fields setting
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Inspect or prune the operator log
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Run pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = catsync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("catsync-cli ready; run with --help for commands");
        return Ok(());
    };

    match command {
        Commands::Log { command } => logs::run(&config, command).await,
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = catsync_db::run_migrations(&pool).await?;
                    println!("migrations applied: {applied}");
                }
                DbCommands::Ping => {
                    catsync_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
            Ok(())
        }
        Commands::Fetch => {
            let ctx = build_context(&config).await?;
            products::run_fetch(&ctx).await
        }
        Commands::Import {
            offset,
            all,
            delay_ms,
        } => {
            let ctx = build_context(&config).await?;
            products::run_import(&ctx, offset, all, delay_ms).await
        }
        Commands::Refresh { external_id } => {
            let ctx = build_context(&config).await?;
            products::run_refresh(&ctx, &external_id).await
        }
        Commands::Settings { command } => {
            let ctx = build_context(&config).await?;
            settings::run(&ctx, command).await
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = catsync_db::PoolConfig::from_app_config(config);
    let pool = catsync_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

/// Connect, migrate, and wire the Postgres stores into a [`SyncContext`].
async fn build_context(config: &AppConfig) -> anyhow::Result<SyncContext> {
    let pool = connect(config).await?;
    catsync_db::run_migrations(&pool).await?;
    let ctx = SyncContext::from_config(
        config,
        Arc::new(PgCacheStore::new(pool.clone())),
        Arc::new(PgSettingsStore::new(pool)),
    )?;
    Ok(ctx)
}

#[cfg(test)]
mod tests;
