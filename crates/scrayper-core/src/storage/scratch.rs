//! Scratch file for a sample before it is published into storage.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// A sample being written in the scratch directory.
pub(super) struct ScratchFile {
    file: File,
    path: PathBuf,
}

impl ScratchFile {
    /// Create (or truncate) the scratch file at `path`.
    pub(super) fn create(path: &Path) -> Result<Self, StorageError> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Write all of `bytes` and sync them to disk.
    pub(super) fn write_synced(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        self.file
            .write_all(bytes)
            .and_then(|()| self.file.sync_all())
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })
    }

    /// Rename into `final_path`, closing the file first. Fails if the target
    /// directory is missing or on a different filesystem.
    pub(super) fn publish(self, final_path: &Path) -> Result<(), StorageError> {
        let ScratchFile { file, path } = self;
        drop(file);

        std::fs::rename(&path, final_path).map_err(|source| StorageError::Rename {
            from: path,
            to: final_path.to_path_buf(),
            source,
        })
    }
}

/// Best-effort removal of a scratch file left behind by a failed placement.
pub(super) fn discard(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("removed scratch file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("could not remove scratch file {}: {}", path.display(), e),
    }
}
