use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Transport settings (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Hard timeout for the HEAD probe.
    pub probe_timeout_secs: u64,
    /// Abort a chunk transfer if throughput stays below this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit: u32,
    /// Seconds throughput may stay below `low_speed_limit` before the transfer is aborted.
    pub low_speed_time_secs: u64,
    pub max_redirections: u32,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            probe_timeout_secs: 30,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
            user_agent: crate::http::default_user_agent(),
        }
    }
}

/// Global configuration loaded from `~/.config/rangedl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangedlConfig {
    /// Default number of concurrent chunk downloads.
    pub threads: usize,
    /// Default chunk size in bytes.
    pub chunk_size: u64,
    /// How long to wait for in-flight chunks after the first failure, in seconds.
    pub shutdown_grace_secs: u64,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for RangedlConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            chunk_size: 1_048_576,
            shutdown_grace_secs: 30,
            http: HttpConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rangedl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RangedlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RangedlConfig::default();
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

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<RangedlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: RangedlConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RangedlConfig::default();
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.chunk_size, 1_048_576);
        assert_eq!(cfg.shutdown_grace_secs, 30);
        assert_eq!(cfg.http.max_redirections, 10);
        assert!(cfg.http.user_agent.starts_with("rangedl/"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RangedlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RangedlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.threads, cfg.threads);
        assert_eq!(parsed.chunk_size, cfg.chunk_size);
        assert_eq!(parsed.http.low_speed_limit, cfg.http.low_speed_limit);
    }

    #[test]
    fn config_toml_without_http_section() {
        let toml = r#"
            threads = 8
            chunk_size = 262144
            shutdown_grace_secs = 5
        "#;
        let cfg: RangedlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.threads, 8);
        assert_eq!(cfg.chunk_size, 262_144);
        assert_eq!(cfg.shutdown_grace_secs, 5);
        assert_eq!(cfg.http.connect_timeout_secs, 30);
    }

    #[test]
    fn config_toml_partial_http_section() {
        let toml = r#"
            threads = 2
            chunk_size = 4096
            shutdown_grace_secs = 30

            [http]
            connect_timeout_secs = 5
            user_agent = "mirror-bot/1.0"
        "#;
        let cfg: RangedlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.http.connect_timeout_secs, 5);
        assert_eq!(cfg.http.user_agent, "mirror-bot/1.0");
        assert_eq!(cfg.http.max_redirections, 10);
        assert_eq!(cfg.http.low_speed_time_secs, 60);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "threads = \"many\"").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse config"));
    }
}
