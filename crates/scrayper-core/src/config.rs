use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::names::HashPolicy;

/// What to do when a fetched sample cannot be written or moved into storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFailurePolicy {
    /// Terminate the run.
    #[default]
    Abort,
    /// Log the failure and continue with the next row.
    Skip,
}

/// What to do with a sample response whose status is neither 2xx nor 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatusPolicy {
    /// Store the body anyway (with a warning).
    #[default]
    Store,
    /// Skip the row.
    Skip,
}

/// Listing site to harvest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Display name, printed in the run banner.
    pub name: String,
    /// Listing URL; the page query is appended as `?&page=N`.
    pub listing_base_url: String,
    /// Subdirectory of the storage root receiving this source's samples.
    pub category: String,
    /// First listing page (inclusive).
    pub first_page: u32,
    /// Last listing page (inclusive).
    pub last_page: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: "malc0de".to_string(),
            listing_base_url: "http://malc0de.com/database/".to_string(),
            category: "malcode".to_string(),
            first_page: 1,
            last_page: 3,
        }
    }
}

impl SourceConfig {
    pub fn page_range(&self) -> RangeInclusive<u32> {
        self.first_page..=self.last_page
    }
}

/// PostgreSQL connection parameters. Only opened and pinged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// If false, no connection is attempted.
    pub enabled: bool,
    /// If true, an unreachable database aborts the run instead of warning.
    pub required: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    /// libpq sslmode (`disable`, `prefer`, `require`, ...).
    pub sslmode: String,
    /// How long to wait for a connection before giving up, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            required: false,
            host: "127.0.0.1".to_string(),
            port: 5432,
            user: "scrayper".to_string(),
            password: String::new(),
            dbname: "scrayper".to_string(),
            sslmode: "disable".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Connection description for logs (password omitted).
    pub fn describe(&self) -> String {
        format!(
            "host={} port={} user={} dbname={} sslmode={}",
            self.host, self.port, self.user, self.dbname, self.sslmode
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/scrayper/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Root of the storage tree; samples land in `{storage_root}/{category}/{hash}`.
    pub storage_root: PathBuf,
    /// Where samples are written before being moved into storage.
    pub scratch_dir: PathBuf,
    /// Directory receiving the run log at the end of a run.
    pub log_dir: PathBuf,
    pub hash_policy: HashPolicy,
    pub on_storage_error: StorageFailurePolicy,
    pub error_status: ErrorStatusPolicy,
    /// Optional per-sample download timeout in seconds (None = wait indefinitely).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_timeout_secs: Option<u64>,
    pub source: SourceConfig,
    pub database: DatabaseConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("../specimen_storage"),
            scratch_dir: PathBuf::from("."),
            log_dir: PathBuf::from("./logs"),
            hash_policy: HashPolicy::default(),
            on_storage_error: StorageFailurePolicy::default(),
            error_status: ErrorStatusPolicy::default(),
            sample_timeout_secs: None,
            source: SourceConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl HarvestConfig {
    pub fn sample_timeout(&self) -> Option<Duration> {
        self.sample_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("scrayper")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the XDG path, creating a default file if none exists.
pub fn load_or_init() -> Result<HarvestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HarvestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path. Missing keys take their defaults.
pub fn load_from(path: &Path) -> Result<HarvestConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: HarvestConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = HarvestConfig::default();
        assert_eq!(cfg.source.page_range(), 1..=3);
        assert_eq!(cfg.source.category, "malcode");
        assert_eq!(cfg.storage_root, PathBuf::from("../specimen_storage"));
        assert_eq!(cfg.on_storage_error, StorageFailurePolicy::Abort);
        assert_eq!(cfg.error_status, ErrorStatusPolicy::Store);
        assert_eq!(cfg.hash_policy, HashPolicy::Reject);
        assert!(cfg.sample_timeout().is_none());
        assert!(!cfg.database.required);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = HarvestConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: HarvestConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.source.listing_base_url, cfg.source.listing_base_url);
        assert_eq!(parsed.log_dir, cfg.log_dir);
        assert_eq!(parsed.database.port, cfg.database.port);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
            storage_root = "/srv/specimens"
            on_storage_error = "skip"
            sample_timeout_secs = 30

            [source]
            last_page = 10
        "#;
        let cfg: HarvestConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.storage_root, PathBuf::from("/srv/specimens"));
        assert_eq!(cfg.on_storage_error, StorageFailurePolicy::Skip);
        assert_eq!(cfg.sample_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.source.page_range(), 1..=10);
        assert_eq!(cfg.source.name, "malc0de");
        assert_eq!(cfg.scratch_dir, PathBuf::from("."));
    }

    #[test]
    fn policies_parse_lowercase() {
        let toml = r#"
            hash_policy = "sanitize"
            error_status = "skip"

            [database]
            enabled = false
            required = true
            sslmode = "require"
        "#;
        let cfg: HarvestConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.hash_policy, HashPolicy::Sanitize);
        assert_eq!(cfg.error_status, ErrorStatusPolicy::Skip);
        assert!(!cfg.database.enabled);
        assert!(cfg.database.required);
        assert_eq!(cfg.database.sslmode, "require");
    }

    #[test]
    fn describe_omits_password() {
        let mut db = DatabaseConfig::default();
        db.password = "hunter2".to_string();
        let text = db.describe();
        assert!(text.contains("host=127.0.0.1"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_dir = \"/var/log/scrayper\"\n").unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.log_dir, PathBuf::from("/var/log/scrayper"));
    }
}
