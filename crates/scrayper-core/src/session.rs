//! Run session: configuration, run log and database handle for one invocation.
//!
//! Opened once at start and closed once at end. The run log is relocated on
//! close, or when the session is dropped after an aborted run.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::HarvestConfig;
use crate::error::PersistenceError;
use crate::logging::RunLog;
use crate::persist::{self, PersistenceHandle};

pub struct RunSession {
    config: HarvestConfig,
    log: Option<RunLog>,
    db: Option<PersistenceHandle>,
}

impl RunSession {
    /// Start a session. An unreachable database is a warning unless
    /// `database.required` is set.
    pub async fn open(
        config: HarvestConfig,
        mut log: Option<RunLog>,
    ) -> Result<Self, PersistenceError> {
        if let Some(log) = log.as_mut() {
            log.set_destination(&config.log_dir);
        }

        let db = if !config.database.enabled {
            tracing::debug!("database disabled");
            None
        } else {
            match persist::open_and_ping(&config.database).await {
                Ok(handle) => {
                    tracing::info!("database reachable ({})", config.database.describe());
                    Some(handle)
                }
                Err(e) if config.database.required => {
                    tracing::error!("database unavailable ({}): {}", config.database.describe(), e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        "database unavailable ({}), continuing: {}",
                        config.database.describe(),
                        e
                    );
                    None
                }
            }
        };

        Ok(Self { config, log, db })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn database(&self) -> Option<&PersistenceHandle> {
        self.db.as_ref()
    }

    /// Release the database handle and move the run log into the log dir.
    /// Returns the final log path, if a run log was attached.
    pub async fn close(mut self) -> Result<Option<PathBuf>> {
        if let Some(db) = self.db.take() {
            db.close().await;
            tracing::debug!("database handle closed");
        }
        match self.log.take() {
            Some(log) => log.finish().map(Some),
            None => Ok(None),
        }
    }
}
