use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use royalty_dashboard_server::analytics::SqliteAnalyticsStore;
use royalty_dashboard_server::config;
use royalty_dashboard_server::royalty::SqliteRoyaltyStore;
use royalty_dashboard_server::server::{metrics, run_server, RequestsLoggingLevel, ServerState};
use royalty_dashboard_server::sqlite_persistence::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_READ_POOL_SIZE};
use royalty_dashboard_server::support::SqliteSupportStore;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing database files (royalty.db, analytics.db, support.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = config::DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Largest accepted royalty report upload, in megabytes.
    #[clap(long, default_value_t = config::DEFAULT_MAX_UPLOAD_SIZE_MB)]
    pub max_upload_size_mb: usize,

    /// Number of read-only connections per database.
    #[clap(long, default_value_t = DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,

    /// How long a connection waits on a locked database, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_BUSY_TIMEOUT_MS)]
    pub busy_timeout_ms: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            max_upload_size_mb: args.max_upload_size_mb,
            read_pool_size: args.read_pool_size,
            busy_timeout_ms: args.busy_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // TOML overrides CLI
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);
    info!("  max upload size: {} MB", app_config.max_upload_size_mb);

    info!("Initializing metrics...");
    metrics::init_metrics();

    info!(
        "Opening royalty database at {:?}",
        app_config.royalty_db_path()
    );
    let royalty_store = Arc::new(SqliteRoyaltyStore::new(
        app_config.royalty_db_path(),
        app_config.database,
    )?);

    info!(
        "Opening analytics database at {:?}",
        app_config.analytics_db_path()
    );
    let analytics_store = Arc::new(SqliteAnalyticsStore::new(
        app_config.analytics_db_path(),
        app_config.database,
    )?);

    info!(
        "Opening support database at {:?}",
        app_config.support_db_path()
    );
    let support_store = Arc::new(SqliteSupportStore::new(
        app_config.support_db_path(),
        app_config.database,
    )?);

    let state = ServerState::new(
        app_config.server_config(),
        royalty_store,
        analytics_store,
        support_store,
    );

    run_server(state).await
}
