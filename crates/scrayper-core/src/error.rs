//! Error taxonomy for the harvest pipeline.
//!
//! Row-level conditions (`RowAnomaly`, network failures, 404s) never leave the
//! row unit; `HarvestError` is what terminates a run.

use std::path::PathBuf;
use thiserror::Error;

/// A listing page could not be fetched. Always fatal to the run.
#[derive(Debug, Error)]
pub enum ListingFetchError {
    #[error("listing page {page}: invalid URL {url:?}: {source}")]
    InvalidUrl {
        page: u32,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("listing page {page} ({url}): {source}")]
    Transport {
        page: u32,
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("listing page {page} ({url}): status code error: {status} {status_text}")]
    Status {
        page: u32,
        url: String,
        status: u32,
        status_text: String,
    },
}

/// A listing row matched the row selector but lacks a required cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowAnomaly {
    #[error("row {row}: missing column {column}")]
    MissingColumn { row: usize, column: usize },
}

/// The selector set for the listing table could not be compiled.
#[derive(Debug, Error)]
#[error("invalid selector {selector:?}: {message}")]
pub struct ExtractError {
    pub selector: &'static str,
    pub message: String,
}

/// Writing a sample to scratch or publishing it into storage failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write scratch file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The database handle could not be opened or did not answer a ping.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unrecognised sslmode {0:?}")]
    SslMode(String),
    #[error("database ping failed: {0}")]
    Ping(#[source] sqlx::Error),
}

/// Conditions that abort a harvest run.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("empty page range: first page {first} is after last page {last}")]
    EmptyRange { first: u32, last: u32 },
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Listing(#[from] ListingFetchError),
    #[error("sample {file_hash}: {source}")]
    Storage {
        file_hash: String,
        #[source]
        source: StorageError,
    },
}
