use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};

use crate::config::AppConfig;
use crate::store::{StoreError, StoreResult};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Builds the process-wide connection pool and, unless disabled, brings the schema up to date.
pub fn build_pool(config: &AppConfig) -> StoreResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.connection_url());
    let pool = Pool::builder()
        .max_size(config.db_pool_max_size)
        .test_on_check_out(true)
        .build(manager)
        .map_err(|e| {
            error!("Failed to establish database connection: {}", e);
            StoreError::Connection(e.to_string())
        })?;
    info!("Database pool ready (max_size={})", config.db_pool_max_size);

    if config.run_migrations {
        run_migrations(&pool)?;
    }
    Ok(pool)
}

pub fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    let mut pooled = pool
        .get()
        .map_err(|e| StoreError::Connection(e.to_string()))?;
    let conn: &mut PgConnection = &mut pooled;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}
