//! Startup configuration.
//!
//! Settings come from the command line and, optionally, a TOML file. Any
//! value present in the file wins over the command line.

mod file_config;

pub use file_config::{DatabaseConfig, FileConfig, RoyaltyConfig};

use crate::server::{RequestsLoggingLevel, ServerConfig};
use crate::sqlite_persistence::{PoolSettings, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_READ_POOL_SIZE};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::server::config::DEFAULT_MAX_UPLOAD_SIZE_MB;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_METRICS_PORT: u16 = 9091;

const ROYALTY_DB_FILE: &str = "royalty.db";
const ANALYTICS_DB_FILE: &str = "analytics.db";
const SUPPORT_DB_FILE: &str = "support.db";

/// Command line settings, already parsed.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub max_upload_size_mb: usize,
    pub read_pool_size: usize,
    pub busy_timeout_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            port: DEFAULT_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
            max_upload_size_mb: DEFAULT_MAX_UPLOAD_SIZE_MB,
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub max_upload_size_mb: usize,
    pub database: PoolSettings,
}

fn check_db_dir(db_dir: &Path) -> Result<()> {
    if !db_dir.exists() {
        bail!("Database directory {:?} does not exist", db_dir);
    }
    if !db_dir.is_dir() {
        bail!("Database path {:?} is not a directory", db_dir);
    }
    Ok(())
}

fn positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        bail!("{} must be greater than 0", name);
    }
    Ok(value)
}

impl AppConfig {
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let royalty = file.royalty.unwrap_or_default();
        let database = file.database.unwrap_or_default();

        let db_dir = match file.db_dir {
            Some(dir) => PathBuf::from(dir),
            None => cli
                .db_dir
                .clone()
                .ok_or_else(|| anyhow!("No database directory: pass --db-dir or set db_dir"))?,
        };
        check_db_dir(&db_dir)?;

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        // An unparseable level in the file is ignored
        let logging_level = match file.logging_level.as_deref().and_then(parse_logging_level) {
            Some(level) => level,
            None => cli.logging_level.clone(),
        };

        let max_upload_size_mb = positive(
            "max_upload_size_mb",
            royalty.max_upload_size_mb.unwrap_or(cli.max_upload_size_mb),
        )?;
        let read_pool_size = positive(
            "read_pool_size",
            database.read_pool_size.unwrap_or(cli.read_pool_size),
        )?;
        let busy_timeout_ms = database.busy_timeout_ms.unwrap_or(cli.busy_timeout_ms);

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path: file.frontend_dir_path.or_else(|| cli.frontend_dir_path.clone()),
            max_upload_size_mb,
            database: PoolSettings {
                read_pool_size,
                busy_timeout: Duration::from_millis(busy_timeout_ms),
            },
        })
    }

    pub fn royalty_db_path(&self) -> PathBuf {
        self.db_dir.join(ROYALTY_DB_FILE)
    }

    pub fn analytics_db_path(&self) -> PathBuf {
        self.db_dir.join(ANALYTICS_DB_FILE)
    }

    pub fn support_db_path(&self) -> PathBuf {
        self.db_dir.join(SUPPORT_DB_FILE)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            frontend_dir_path: self.frontend_dir_path.clone(),
            max_upload_size_mb: self.max_upload_size_mb,
        }
    }
}

/// Case-insensitive, through clap's `ValueEnum`.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
