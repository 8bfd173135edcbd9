use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};
use std::time::Duration;

use crate::settings::AppConfig;

/// Whether the pool reached the database during startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    Connected,
    Deferred,
}

fn pool_options(config: &AppConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
}

/// Connects with exponential backoff. When every attempt fails the service still
/// starts on a lazily connecting pool, so read paths can use their fallbacks and
/// the pool reconnects once the database comes back.
pub async fn create_pool(config: &AppConfig) -> Result<(PgPool, PoolStatus), sqlx::Error> {
    let max_retries = 5;
    let mut retry_count = 0;
    let mut wait_seconds = 2;

    loop {
        match pool_options(config).connect(&config.database_url).await {
            Ok(pool) => {
                info!("Database connection established.");
                return Ok((pool, PoolStatus::Connected));
            }
            Err(e) if retry_count < max_retries => {
                retry_count += 1;
                info!(
                    "Failed to connect to database (attempt {}/{}): {}. Retrying in {}s...",
                    retry_count, max_retries, e, wait_seconds);

                tokio::time::sleep(Duration::from_secs(wait_seconds)).await;

                wait_seconds *= 2;
            }
            Err(e) => {
                warn!("Database unreachable after {} attempts: {}. Starting in degraded mode.", max_retries, e);
                let pool = pool_options(config).connect_lazy(&config.database_url)?;
                return Ok((pool, PoolStatus::Deferred));
            }
        }
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied.");
    Ok(())
}
