mod api;
mod middleware;

use std::sync::Arc;

use catsync_db::{PgCacheStore, PgSettingsStore};
use catsync_sync::SyncContext;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = catsync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = catsync_db::PoolConfig::from_app_config(&config);
    let pool = catsync_db::connect_pool(&config.database_url, pool_config).await?;
    catsync_db::run_migrations(&pool).await?;

    let sync = SyncContext::from_config(
        &config,
        Arc::new(PgCacheStore::new(pool.clone())),
        Arc::new(PgSettingsStore::new(pool.clone())),
    )?;
    if !sync.has_commerce() {
        tracing::warn!("CATSYNC_COMMERCE_URL not set; import and refresh endpoints will fail");
    }

    let auth = AuthState::from_env(matches!(
        config.env,
        catsync_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            pool,
            sync: Arc::new(sync),
        },
        auth,
    );

    tracing::info!(addr = %config.bind_addr, "catsync server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
