// PostgreSQL connection pool
// The concrete store behind the QueryExecutor seam

use crate::config::DatabaseConfig;
use crate::db::executor::QueryExecutor;
use crate::errors::DatabaseError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Shared handle to the PostgreSQL pool.
///
/// Clones share one pool. Connection limits and the acquire timeout from
/// [`DatabaseConfig`] are the only backpressure applied to repository calls.
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    /// Connect using the configured URL and pool bounds
    ///
    /// # Errors
    /// `DatabaseError::ConnectionFailed` when no connection can be established
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Could not connect to the job board database");
                DatabaseError::ConnectionFailed(e.to_string())
            })?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Job board database pool ready"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial statement through the same path repositories use
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.query("SELECT 1 AS ok", Vec::new())
            .await
            .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Job board database pool closed");
    }
}
