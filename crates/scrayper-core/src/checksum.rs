//! Sample digests as lowercase hex: SHA-256 for our records, MD5 to compare
//! against the hash column of the listing.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Digest of an in-memory sample.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 of a file on disk.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    read_chunks(path, |chunk| hasher.update(chunk))?;
    Ok(hex::encode(hasher.finalize()))
}

/// MD5 of a file on disk.
pub fn md5_path(path: &Path) -> Result<String> {
    let mut ctx = md5::Context::new();
    read_chunks(path, |chunk| ctx.consume(chunk))?;
    Ok(format!("{:x}", ctx.compute()))
}

fn read_chunks(path: &Path, mut sink: impl FnMut(&[u8])) -> Result<()> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            return Ok(());
        }
        sink(&buf[..n]);
    }
}
