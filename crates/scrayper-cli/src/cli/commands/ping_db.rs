//! `scrayper ping-db` – database liveness check.

use anyhow::{Context, Result};
use scrayper_core::config::DatabaseConfig;
use scrayper_core::persist;

pub async fn run_ping_db(cfg: &DatabaseConfig) -> Result<()> {
    let handle = persist::open_and_ping(cfg)
        .await
        .with_context(|| format!("database unreachable ({})", cfg.describe()))?;
    handle.close().await;
    tracing::info!("database reachable ({})", cfg.describe());
    println!("database reachable ({})", cfg.describe());
    Ok(())
}
