//! `scrayper harvest` – run the harvest pipeline for the configured source.

use anyhow::{Context, Result};
use scrayper_core::config::HarvestConfig;
use scrayper_core::logging::RunLog;
use scrayper_core::{Harvester, RunSession};

/// Open the session, run the blocking pipeline off the async runtime, then
/// close the session whether or not the pipeline succeeded.
pub async fn run_harvest(cfg: HarvestConfig, run_log: Option<RunLog>) -> Result<()> {
    let session = RunSession::open(cfg, run_log).await?;

    let harvester = Harvester::new(session.config().clone());
    let outcome = tokio::task::spawn_blocking(move || harvester.run()).await;
    if let Ok(Err(e)) = &outcome {
        tracing::error!("harvest aborted: {}", e);
    }

    let closed = session.close().await;
    outcome.context("harvest task failed")??;
    closed?;
    Ok(())
}
