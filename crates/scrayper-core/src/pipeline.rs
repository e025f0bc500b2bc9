//! Harvest pipeline: pages -> rows -> fetch -> place.
//!
//! Pages are processed in increasing index order and rows in document order.
//! Each row produces exactly one [`RowOutcome`]; only listing failures and
//! (under the `abort` policy) storage failures end the run.

use crate::config::{ErrorStatusPolicy, HarvestConfig, StorageFailurePolicy};
use crate::error::{HarvestError, RowAnomaly};
use crate::extract::{RowRecord, TableLayout};
use crate::fetch::{sample_url, FetchOutcome, SampleFetcher};
use crate::listing::Paginator;
use crate::names;
use crate::storage::{StoragePlacer, StoredSample};

/// What happened to one listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Stored(StoredSample),
    NotFound,
    NetworkError,
    Anomaly,
    RejectedName,
    ErrorStatusSkipped,
    StorageSkipped,
}

/// Tally of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub pages: u32,
    pub rows: u64,
    pub stored: u64,
    pub not_found: u64,
    pub network_errors: u64,
    pub anomalies: u64,
    pub rejected_names: u64,
    pub error_status_skipped: u64,
    pub storage_skipped: u64,
}

impl HarvestReport {
    fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match outcome {
            RowOutcome::Stored(_) => self.stored += 1,
            RowOutcome::NotFound => self.not_found += 1,
            RowOutcome::NetworkError => self.network_errors += 1,
            RowOutcome::Anomaly => self.anomalies += 1,
            RowOutcome::RejectedName => self.rejected_names += 1,
            RowOutcome::ErrorStatusSkipped => self.error_status_skipped += 1,
            RowOutcome::StorageSkipped => self.storage_skipped += 1,
        }
    }
}

/// Runs the pipeline for one configured source. Blocking.
pub struct Harvester {
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<HarvestReport, HarvestError> {
        let source = &self.config.source;
        if source.first_page > source.last_page {
            return Err(HarvestError::EmptyRange {
                first: source.first_page,
                last: source.last_page,
            });
        }

        let layout = TableLayout::new()?;
        let paginator = Paginator::new(source);
        let fetcher = SampleFetcher::new(self.config.sample_timeout());
        let placer = StoragePlacer::new(
            &self.config.scratch_dir,
            &self.config.storage_root,
            &source.category,
        );

        paginator.announce();
        let mut report = HarvestReport::default();
        for index in source.page_range() {
            let page = paginator.fetch_page(index)?;
            report.pages += 1;
            let before = report.rows;
            for row in page.rows(&layout) {
                let outcome = self.process_row(row, &fetcher, &placer)?;
                report.record(&outcome);
            }
            tracing::debug!(page = index, rows = report.rows - before, "listing page done");
        }

        tracing::info!(
            pages = report.pages,
            rows = report.rows,
            stored = report.stored,
            not_found = report.not_found,
            network_errors = report.network_errors,
            anomalies = report.anomalies,
            rejected = report.rejected_names,
            storage_skipped = report.storage_skipped,
            "harvest finished"
        );
        Ok(report)
    }

    /// Handle one row. Only a storage failure under the `abort` policy is an error.
    pub fn process_row(
        &self,
        row: Result<RowRecord, RowAnomaly>,
        fetcher: &SampleFetcher,
        placer: &StoragePlacer,
    ) -> Result<RowOutcome, HarvestError> {
        let row = match row {
            Ok(row) => row,
            Err(anomaly) => {
                tracing::warn!("[SKIP] malformed listing row: {}", anomaly);
                return Ok(RowOutcome::Anomaly);
            }
        };

        let file_name = match names::resolve_file_name(self.config.hash_policy, &row.file_hash) {
            Ok(name) => name,
            Err(reason) => {
                tracing::warn!(
                    "[SKIP] {}: unusable file hash {:?}: {}",
                    sample_url(&row.host),
                    row.file_hash,
                    reason
                );
                return Ok(RowOutcome::RejectedName);
            }
        };

        let (status, bytes) = match fetcher.fetch_sample(&row) {
            FetchOutcome::NetworkError { cause, .. } => {
                tracing::info!("[SKIP] {} unreachable: {}", sample_url(&row.host), cause);
                return Ok(RowOutcome::NetworkError);
            }
            FetchOutcome::NotFound => {
                tracing::info!("[SKIP] {} not found", sample_url(&row.host));
                return Ok(RowOutcome::NotFound);
            }
            FetchOutcome::Success { status, bytes } => (status, bytes),
        };

        if !(200..300).contains(&status) {
            match self.config.error_status {
                ErrorStatusPolicy::Store => {
                    tracing::warn!("storing body of HTTP {} response as {}", status, file_name);
                }
                ErrorStatusPolicy::Skip => {
                    tracing::info!("[SKIP] {} answered HTTP {}", sample_url(&row.host), status);
                    return Ok(RowOutcome::ErrorStatusSkipped);
                }
            }
        }

        tracing::info!("[OK] filehash is {}", file_name);
        match placer.place(&file_name, &bytes) {
            Ok(sample) => {
                tracing::info!(
                    bytes = sample.len,
                    sha256 = %sample.sha256,
                    "[OK] filepath is {}",
                    sample.path.display()
                );
                Ok(RowOutcome::Stored(sample))
            }
            Err(e) => match self.config.on_storage_error {
                StorageFailurePolicy::Abort => Err(HarvestError::Storage {
                    file_hash: file_name,
                    source: e,
                }),
                StorageFailurePolicy::Skip => {
                    tracing::error!("[SKIP] {}", e);
                    Ok(RowOutcome::StorageSkipped)
                }
            },
        }
    }
}

/// Run the pipeline for `config`.
pub fn harvest(config: &HarvestConfig) -> Result<HarvestReport, HarvestError> {
    Harvester::new(config.clone()).run()
}
