use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{fmt::Debug, path::PathBuf};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lavoro_server::applications::ApplicationStore;
use lavoro_server::board::{BoardStore, CompanyStore, JobStore, SqliteBoardStore};
use lavoro_server::config::{AppConfig, CliConfig, FileConfig};
use lavoro_server::notifications::NotificationStore;
use lavoro_server::server::{self, run_server, RequestsLoggingLevel};
use lavoro_server::user::{FullUserStore, SqliteUserStore, UserAuthTokenStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite board database file (companies, jobs, applications).
    #[clap(value_parser = parse_path)]
    pub board_db: Option<PathBuf>,

    /// Path to the SQLite database file to use for user storage.
    #[clap(value_parser = parse_path)]
    pub user_db: Option<PathBuf>,

    /// Path to an optional TOML config file. Its values override the CLI.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of public board content in the cache in seconds.
    #[clap(long, default_value_t = 300)]
    pub content_cache_age_sec: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Days to retain read notifications before pruning. 0 disables pruning.
    #[clap(long, default_value_t = 90)]
    pub notification_retention_days: u64,

    /// Days an auth token may sit unused before pruning. 0 disables pruning.
    #[clap(long, default_value_t = 30)]
    pub token_retention_days: u64,

    /// Interval in hours between retention pruning runs.
    #[clap(long, default_value_t = 24)]
    pub prune_interval_hours: u64,

    /// Interval in seconds between sweeps expiring overdue job postings.
    /// 0 disables the sweep (expiry still happens on every read).
    #[clap(long, default_value_t = 300)]
    pub expiry_sweep_interval_secs: u64,
}

fn spawn_retention_task(user_store: Arc<dyn FullUserStore>, config: &AppConfig) {
    let notification_retention_days = config.notification_retention_days;
    let token_retention_days = config.token_retention_days;
    let interval_hours = config.prune_interval_hours.max(1);

    info!(
        "Retention pruning enabled: notifications {}d, tokens {}d, every {}h",
        notification_retention_days, token_retention_days, interval_hours
    );

    tokio::spawn(async move {
        let interval = Duration::from_secs(interval_hours * 60 * 60);
        let mut ticker = tokio::time::interval(interval);

        // Skip the first immediate tick, wait for the first interval
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if notification_retention_days > 0 {
                let cutoff = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_secs() as i64
                    - (notification_retention_days as i64 * 24 * 60 * 60);
                match user_store.prune_read_notifications(cutoff) {
                    Ok(count) if count > 0 => info!("Pruned {} old notifications", count),
                    Ok(_) => {}
                    Err(e) => error!("Failed to prune notifications: {}", e),
                }
            }

            if token_retention_days > 0 {
                match user_store.prune_unused_auth_tokens(token_retention_days) {
                    Ok(count) if count > 0 => info!("Pruned {} stale auth tokens", count),
                    Ok(_) => {}
                    Err(e) => error!("Failed to prune auth tokens: {}", e),
                }
            }
        }
    });
}

fn spawn_expiry_sweep(board_store: Arc<SqliteBoardStore>, interval_secs: u64) {
    info!("Job expiry sweep enabled: every {}s", interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs() as i64;
            match board_store.expire_overdue_jobs(now) {
                Ok(count) if count > 0 => info!("Expired {} overdue job postings", count),
                Ok(_) => {}
                Err(e) => error!("Failed to expire overdue jobs: {}", e),
            }
        }
    });
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
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        board_db: cli_args.board_db,
        user_db: cli_args.user_db,
        port: cli_args.port,
        metrics_port: cli_args.metrics_port,
        logging_level: cli_args.logging_level,
        content_cache_age_sec: cli_args.content_cache_age_sec,
        frontend_dir_path: cli_args.frontend_dir_path,
        notification_retention_days: cli_args.notification_retention_days,
        token_retention_days: cli_args.token_retention_days,
        prune_interval_hours: cli_args.prune_interval_hours,
        expiry_sweep_interval_secs: cli_args.expiry_sweep_interval_secs,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite board database at {:?}...", config.board_db);
    let board_store = Arc::new(SqliteBoardStore::new(&config.board_db)?);

    info!("Opening SQLite user database at {:?}...", config.user_db);
    let user_store: Arc<dyn FullUserStore> = Arc::new(SqliteUserStore::new(&config.user_db)?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();
    server::metrics::init_board_metrics(lavoro_server::board::BoardStats {
        companies: board_store.count_companies().unwrap_or(0),
        jobs_total: board_store.count_jobs(None).unwrap_or(0),
        jobs_active: board_store
            .count_jobs(Some(lavoro_server::board::JobStatus::Active))
            .unwrap_or(0),
        applications: board_store.count_applications().unwrap_or(0),
    });

    if config.notification_retention_days > 0 || config.token_retention_days > 0 {
        spawn_retention_task(user_store.clone(), &config);
    }
    if config.expiry_sweep_interval_secs > 0 {
        spawn_expiry_sweep(board_store.clone(), config.expiry_sweep_interval_secs);
    }

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    let board_store: Arc<dyn BoardStore> = board_store;
    run_server(
        board_store,
        user_store,
        config.logging_level,
        config.port,
        config.metrics_port,
        config.content_cache_age_sec,
        config.frontend_dir_path,
    )
    .await
}
