//! Storage placement.
//!
//! A fetched sample is first written under its hash in the scratch directory,
//! then renamed to `{storage_root}/{category}/{hash}`. The rename is the
//! publish point: nothing partially written ever appears in storage. The
//! target directory is never created here.

mod scratch;

use std::path::{Path, PathBuf};

use crate::checksum;
use crate::error::StorageError;
use crate::names;
use scratch::ScratchFile;

/// A sample published into storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSample {
    pub file_hash: String,
    pub path: PathBuf,
    pub len: u64,
    /// SHA-256 of the stored bytes, lowercase hex.
    pub sha256: String,
}

/// Digests of a sample already in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCheck {
    pub file_hash: String,
    pub path: PathBuf,
    pub md5: String,
    pub sha256: String,
}

impl SampleCheck {
    /// Listing hashes are MD5 digests of the sample; compared case-insensitively.
    pub fn matches_listing(&self) -> bool {
        self.md5.eq_ignore_ascii_case(&self.file_hash)
    }
}

/// Places samples for one storage category.
#[derive(Debug, Clone)]
pub struct StoragePlacer {
    scratch_dir: PathBuf,
    target_dir: PathBuf,
}

impl StoragePlacer {
    pub fn new(scratch_dir: &Path, storage_root: &Path, category: &str) -> Self {
        Self {
            scratch_dir: scratch_dir.to_path_buf(),
            target_dir: storage_root.join(category),
        }
    }

    pub fn scratch_path(&self, file_hash: &str) -> PathBuf {
        self.scratch_dir.join(file_hash)
    }

    pub fn final_path(&self, file_hash: &str) -> PathBuf {
        self.target_dir.join(file_hash)
    }

    /// Write `bytes` to scratch and move them to their final path.
    ///
    /// Placing the same pair twice leaves the same content (last write wins).
    /// If writing or publishing fails, the scratch file created here is removed.
    pub fn place(&self, file_hash: &str, bytes: &[u8]) -> Result<StoredSample, StorageError> {
        let scratch_path = self.scratch_path(file_hash);
        let final_path = self.final_path(file_hash);

        let mut file = ScratchFile::create(&scratch_path)?;
        let result = match file.write_synced(bytes) {
            Ok(()) => file.publish(&final_path),
            Err(e) => {
                drop(file);
                Err(e)
            }
        };
        if let Err(e) = result {
            scratch::discard(&scratch_path);
            return Err(e);
        }

        Ok(StoredSample {
            file_hash: file_hash.to_string(),
            path: final_path,
            len: bytes.len() as u64,
            sha256: checksum::sha256_hex(bytes),
        })
    }

    /// Re-hash the stored sample named `file_hash`.
    pub fn check(&self, file_hash: &str) -> anyhow::Result<SampleCheck> {
        names::check_file_name(file_hash)?;
        let path = self.final_path(file_hash);
        let md5 = checksum::md5_path(&path)?;
        let sha256 = checksum::sha256_path(&path)?;
        Ok(SampleCheck {
            file_hash: file_hash.to_string(),
            path,
            md5,
            sha256,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> (tempfile::TempDir, StoragePlacer) {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("work");
        std::fs::create_dir_all(&scratch).unwrap();
        std::fs::create_dir_all(dir.path().join("store").join("malcode")).unwrap();
        let placer = StoragePlacer::new(&scratch, &dir.path().join("store"), "malcode");
        (dir, placer)
    }

    #[test]
    fn place_publishes_into_category() {
        let (dir, placer) = layout();
        let sample = placer.place("d41d8cd98f00b204", b"MZ\x90\x00").unwrap();

        let expected = dir.path().join("store").join("malcode").join("d41d8cd98f00b204");
        assert_eq!(sample.path, expected);
        assert_eq!(sample.len, 4);
        assert_eq!(std::fs::read(&expected).unwrap(), b"MZ\x90\x00");
        assert!(!placer.scratch_path("d41d8cd98f00b204").exists());
    }

    #[test]
    fn place_twice_is_last_write_wins() {
        let (_dir, placer) = layout();
        let first = placer.place("same", b"payload").unwrap();
        let second = placer.place("same", b"payload").unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second.path).unwrap(), b"payload");

        let shorter = placer.place("same", b"pay").unwrap();
        assert_eq!(std::fs::read(&shorter.path).unwrap(), b"pay");
    }

    #[test]
    fn missing_target_directory_fails_and_cleans_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let placer = StoragePlacer::new(dir.path(), &dir.path().join("absent"), "malcode");
        let err = placer.place("abc", b"bytes").unwrap_err();
        assert!(matches!(err, StorageError::Rename { .. }));
        assert!(!placer.scratch_path("abc").exists());
        assert!(!dir.path().join("absent").exists());
    }

    #[test]
    fn missing_scratch_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let placer = StoragePlacer::new(&dir.path().join("nope"), dir.path(), "malcode");
        let err = placer.place("abc", b"bytes").unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failed_create_leaves_existing_entry_alone() {
        let (dir, placer) = layout();
        let entry = placer.scratch_path("abc");
        std::os::unix::fs::symlink(dir.path().join("absent").join("target"), &entry).unwrap();

        let err = placer.place("abc", b"bytes").unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
        assert!(std::fs::symlink_metadata(&entry).is_ok());
    }

    #[test]
    fn check_compares_md5_with_listed_hash() {
        let (_dir, placer) = layout();
        placer.place("b1946ac92492d2347c6235b4d2611184", b"hello\n").unwrap();
        placer.place("0123456789abcdef0123456789abcdef", b"hello\n").unwrap();

        let good = placer.check("b1946ac92492d2347c6235b4d2611184").unwrap();
        assert!(good.matches_listing());
        assert_eq!(
            good.sha256,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );

        let bad = placer.check("0123456789abcdef0123456789abcdef").unwrap();
        assert!(!bad.matches_listing());
        assert_eq!(bad.md5, "b1946ac92492d2347c6235b4d2611184");
    }

    #[test]
    fn check_refuses_unsafe_names_and_missing_samples() {
        let (_dir, placer) = layout();
        assert!(placer.check("../malcode").is_err());
        assert!(placer.check("absent").is_err());
    }

    #[test]
    fn digest_matches_content() {
        let (_dir, placer) = layout();
        let sample = placer.place("empty", b"").unwrap();
        assert_eq!(
            sample.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
