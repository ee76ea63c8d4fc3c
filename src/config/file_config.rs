use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Optional TOML configuration file. Every field is optional, values that
/// are present override the CLI arguments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub board_db: Option<String>,
    pub user_db: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub content_cache_age_sec: Option<usize>,
    pub frontend_dir_path: Option<String>,
    pub notification_retention_days: Option<u64>,
    pub token_retention_days: Option<u64>,
    pub prune_interval_hours: Option<u64>,
    pub expiry_sweep_interval_secs: Option<u64>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_config() {
        let config: FileConfig = toml::from_str(
            r#"
            port = 8080
            logging_level = "headers"
            notification_retention_days = 14
            "#,
        )
        .unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.logging_level.as_deref(), Some("headers"));
        assert_eq!(config.notification_retention_days, Some(14));
        assert!(config.board_db.is_none());
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(toml::from_str::<FileConfig>("port = \"not a port\"").is_err());
    }
}
