//! CLI for the scrayper sample harvester.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use scrayper_core::config::{self, HarvestConfig};
use scrayper_core::logging::RunLog;
use std::path::{Path, PathBuf};

use commands::{run_harvest, run_ping_db, run_verify};

/// Top-level CLI for the scrayper sample harvester.
#[derive(Debug, Parser)]
#[command(name = "scrayper")]
#[command(about = "scrayper: harvest malware samples from a paginated listing site", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/scrayper/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Walk the listing pages, download every listed sample and move it into storage.
    Harvest(HarvestArgs),

    /// Open the configured database, ping it and close it again.
    PingDb,

    /// Re-hash a stored sample and check it against its listed MD5.
    Verify {
        /// Listed file hash, i.e. the sample's name under the storage category.
        hash: String,
    },
}

/// Per-run overrides of the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct HarvestArgs {
    /// First listing page (inclusive).
    #[arg(long, value_name = "N")]
    pub first_page: Option<u32>,
    /// Last listing page (inclusive).
    #[arg(long, value_name = "N")]
    pub last_page: Option<u32>,
    /// Root of the storage tree.
    #[arg(long, value_name = "PATH")]
    pub storage_root: Option<PathBuf>,
    /// Listing URL to harvest instead of the configured source.
    #[arg(long, value_name = "URL")]
    pub listing_url: Option<String>,
    /// Directory receiving the run log.
    #[arg(long, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,
}

impl HarvestArgs {
    pub fn apply(&self, cfg: &mut HarvestConfig) {
        if let Some(first) = self.first_page {
            cfg.source.first_page = first;
        }
        if let Some(last) = self.last_page {
            cfg.source.last_page = last;
        }
        if let Some(root) = &self.storage_root {
            cfg.storage_root = root.clone();
        }
        if let Some(url) = &self.listing_url {
            cfg.source.listing_base_url = url.clone();
        }
        if let Some(dir) = &self.log_dir {
            cfg.log_dir = dir.clone();
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<HarvestConfig> {
    match path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            config::load_from(path)
        }
        None => config::load_or_init(),
    }
}

impl CliCommand {
    /// Whether this command writes a timestamped run log.
    pub fn keeps_run_log(&self) -> bool {
        matches!(self, CliCommand::Harvest(_))
    }
}

impl Cli {
    pub async fn run(self, run_log: Option<RunLog>) -> Result<()> {
        let mut cfg = load_config(self.config.as_deref())?;

        match self.command {
            CliCommand::Harvest(args) => {
                args.apply(&mut cfg);
                run_harvest(cfg, run_log).await?;
            }
            CliCommand::PingDb => run_ping_db(&cfg.database).await?,
            CliCommand::Verify { hash } => run_verify(&cfg, &hash)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
