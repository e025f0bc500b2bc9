//! PostgreSQL persistence handle.
//!
//! The harvester only checks liveness: open, ping, close. No schema, no
//! queries.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::Connection;

use crate::config::DatabaseConfig;
use crate::error::PersistenceError;

/// Handle to the configured database.
#[derive(Clone)]
pub struct PersistenceHandle {
    pool: PgPool,
}

impl PersistenceHandle {
    /// Build the handle without connecting. Must run inside a tokio runtime.
    pub fn open(cfg: &DatabaseConfig) -> Result<Self, PersistenceError> {
        let ssl_mode: PgSslMode = cfg
            .sslmode
            .parse()
            .map_err(|_| PersistenceError::SslMode(cfg.sslmode.clone()))?;
        let options = PgConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .username(&cfg.user)
            .password(&cfg.password)
            .database(&cfg.dbname)
            .ssl_mode(ssl_mode);
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(cfg.connect_timeout())
            .connect_lazy_with(options);
        Ok(Self { pool })
    }

    /// Establish a connection and ping it.
    pub async fn ping(&self) -> Result<(), PersistenceError> {
        let mut conn = self.pool.acquire().await.map_err(PersistenceError::Ping)?;
        conn.ping().await.map_err(PersistenceError::Ping)
    }

    /// Release all connections.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Open the handle and verify the database answers.
pub async fn open_and_ping(cfg: &DatabaseConfig) -> Result<PersistenceHandle, PersistenceError> {
    let handle = PersistenceHandle::open(cfg)?;
    if let Err(e) = handle.ping().await {
        handle.close().await;
        return Err(e);
    }
    Ok(handle)
}
