mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::Result;
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that take part in config resolution. TOML file values,
/// when present, win over these.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub board_db: Option<PathBuf>,
    pub user_db: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub notification_retention_days: u64,
    pub token_retention_days: u64,
    pub prune_interval_hours: u64,
    pub expiry_sweep_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub board_db: PathBuf,
    pub user_db: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,

    /// Days to keep read notifications around. 0 disables pruning.
    pub notification_retention_days: u64,
    /// Days an auth token may sit unused before it is pruned. 0 disables.
    pub token_retention_days: u64,
    /// Hours between retention pruning runs.
    pub prune_interval_hours: u64,
    /// Seconds between background sweeps expiring overdue Active jobs.
    /// 0 disables the sweep, leaving expiry entirely to the read path.
    pub expiry_sweep_interval_secs: u64,
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let board_db = file
            .board_db
            .map(PathBuf::from)
            .or_else(|| cli.board_db.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("board_db must be specified as an argument or in the config file")
            })?;
        let user_db = file
            .user_db
            .map(PathBuf::from)
            .or_else(|| cli.user_db.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("user_db must be specified as an argument or in the config file")
            })?;

        Ok(AppConfig {
            board_db,
            user_db,
            port: file.port.unwrap_or(cli.port),
            metrics_port: file.metrics_port.unwrap_or(cli.metrics_port),
            logging_level: file
                .logging_level
                .and_then(|s| parse_logging_level(&s))
                .unwrap_or_else(|| cli.logging_level.clone()),
            content_cache_age_sec: file
                .content_cache_age_sec
                .unwrap_or(cli.content_cache_age_sec),
            frontend_dir_path: file
                .frontend_dir_path
                .or_else(|| cli.frontend_dir_path.clone()),
            notification_retention_days: file
                .notification_retention_days
                .unwrap_or(cli.notification_retention_days),
            token_retention_days: file.token_retention_days.unwrap_or(cli.token_retention_days),
            prune_interval_hours: file.prune_interval_hours.unwrap_or(cli.prune_interval_hours),
            expiry_sweep_interval_secs: file
                .expiry_sweep_interval_secs
                .unwrap_or(cli.expiry_sweep_interval_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CliConfig {
        CliConfig {
            board_db: Some(PathBuf::from("/tmp/board.db")),
            user_db: Some(PathBuf::from("/tmp/user.db")),
            port: 3000,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            content_cache_age_sec: 300,
            frontend_dir_path: None,
            notification_retention_days: 90,
            token_retention_days: 30,
            prune_interval_hours: 24,
            expiry_sweep_interval_secs: 300,
        }
    }

    #[test]
    fn cli_values_used_without_file() {
        let config = AppConfig::resolve(&cli(), None).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.board_db, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.notification_retention_days, 90);
    }

    #[test]
    fn file_values_override_cli() {
        let file = FileConfig {
            port: Some(8080),
            logging_level: Some("none".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli(), Some(file)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.logging_level, RequestsLoggingLevel::None);
        // Untouched fields fall back to CLI
        assert_eq!(config.metrics_port, 9091);
    }

    #[test]
    fn missing_db_paths_are_an_error() {
        let mut cli = cli();
        cli.board_db = None;
        assert!(AppConfig::resolve(&cli, None).is_err());
    }
}
