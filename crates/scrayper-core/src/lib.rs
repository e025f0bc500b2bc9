pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http;
pub mod listing;
pub mod names;
pub mod persist;
pub mod pipeline;
pub mod session;
pub mod storage;

pub use error::{HarvestError, ListingFetchError, PersistenceError, RowAnomaly, StorageError};
pub use extract::{ListingPage, RowRecord};
pub use fetch::FetchOutcome;
pub use pipeline::{harvest, HarvestReport, Harvester};
pub use session::RunSession;
pub use storage::StoredSample;
