//! `scrayper verify` – re-hash a stored sample against its listed MD5.

use anyhow::{bail, Result};
use scrayper_core::config::HarvestConfig;
use scrayper_core::storage::StoragePlacer;

pub fn run_verify(cfg: &HarvestConfig, file_hash: &str) -> Result<()> {
    let placer = StoragePlacer::new(&cfg.scratch_dir, &cfg.storage_root, &cfg.source.category);
    let check = placer.check(file_hash)?;
    println!(
        "{}  md5={}  sha256={}",
        check.path.display(),
        check.md5,
        check.sha256
    );
    if !check.matches_listing() {
        bail!(
            "{}: content MD5 {} does not match listed hash",
            check.path.display(),
            check.md5
        );
    }
    tracing::info!("[OK] {} matches its listed hash", file_hash);
    Ok(())
}
