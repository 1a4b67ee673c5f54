use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::db::repositories::{
    FileOrderRepository, InMemoryOrderRepository, PgOrderRepository, SharedOrderRepository,
};
use crate::error::{AppError, AppResult};

pub async fn create_pool(url: &str, max_connections: u32) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(600))
        .connect(url)
        .await?;

    tracing::info!("Database connection pool created successfully");

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(sqlx::Error::Migrate(Box::new(e))))?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}

/// Builds the order store selected by configuration.
pub async fn open_repository(config: &StorageConfig) -> AppResult<SharedOrderRepository> {
    let repo: SharedOrderRepository = match config.backend {
        StorageBackend::File => {
            tracing::info!(path = %config.file_path.display(), "Using JSON file order store");
            Arc::new(FileOrderRepository::open(&config.file_path).await?)
        }
        StorageBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                AppError::Config("DATABASE_URL is required for the postgres backend".to_string())
            })?;
            let pool = create_pool(url, config.max_connections).await?;
            run_migrations(&pool).await?;
            tracing::info!("Using Postgres order store");
            Arc::new(PgOrderRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory order store, records are lost on restart");
            Arc::new(InMemoryOrderRepository::new())
        }
    };

    Ok(repo)
}
