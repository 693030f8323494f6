use gmail_mcp_core::gmail::GMAIL_API_BASE;
use gmail_mcp_core::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DIR_NAME: &str = ".gmail-mcp";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine home directory; set GMAIL_MCP_CONFIG_DIR or pass --config-dir")]
    NoHomeDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamConfig {
    pub max_messages: u32,
    pub batch_size: usize,
    pub batch_pause_ms: u64,
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            max_messages: 500,
            batch_size: 50,
            batch_pause_ms: 1_000,
        }
    }
}

impl SpamConfig {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

/// Everything the server needs at runtime. Paths left unset are derived
/// from `config_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub config_dir: PathBuf,
    pub credentials_path: Option<PathBuf>,
    pub token_path: Option<PathBuf>,
    pub audit_log_path: Option<PathBuf>,
    pub downloads_dir: Option<PathBuf>,
    pub rate_limit: RateLimitConfig,
    pub spam: SpamConfig,
    pub gmail_api_base: String,
    pub oauth_auth_uri: String,
    pub oauth_token_uri: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_DIR_NAME),
            credentials_path: None,
            token_path: None,
            audit_log_path: None,
            downloads_dir: None,
            rate_limit: RateLimitConfig::default(),
            spam: SpamConfig::default(),
            gmail_api_base: GMAIL_API_BASE.to_string(),
            oauth_auth_uri: GOOGLE_AUTH_URI.to_string(),
            oauth_token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
            ..Default::default()
        }
    }

    /// Defaults, then `<dir>/config.yaml`, then `GMAIL_MCP_*` variables.
    /// `config_dir` (from the CLI) beats `GMAIL_MCP_CONFIG_DIR`, which beats
    /// `~/.gmail-mcp`.
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with(config_dir, |key| std::env::var(key).ok())
    }

    pub fn load_with(
        config_dir: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let dir = match config_dir.or_else(|| env("GMAIL_MCP_CONFIG_DIR").map(PathBuf::from)) {
            Some(d) => d,
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(DEFAULT_DIR_NAME),
        };

        let file = dir.join(CONFIG_FILE_NAME);
        let mut cfg = if file.exists() {
            Self::from_file(&file)?
        } else {
            Self::default()
        };
        cfg.config_dir = dir;
        cfg.apply_env(env)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = env("GMAIL_MCP_RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = parse_num("GMAIL_MCP_RATE_LIMIT_MAX", &v)?;
        }
        if let Some(v) = env("GMAIL_MCP_RATE_LIMIT_WINDOW_MS") {
            self.rate_limit.window_ms = parse_num("GMAIL_MCP_RATE_LIMIT_WINDOW_MS", &v)?;
        }
        if let Some(v) = env("GMAIL_MCP_DOWNLOADS_DIR") {
            self.downloads_dir = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid("rate_limit.max_requests must be > 0".into()));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid("rate_limit.window_ms must be > 0".into()));
        }
        if self.spam.batch_size == 0 {
            return Err(ConfigError::Invalid("spam.batch_size must be > 0".into()));
        }
        Ok(())
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("credentials.json"))
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("token.json"))
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.audit_log_path
            .clone()
            .unwrap_or_else(|| self.config_dir.join("audit.log"))
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.downloads_dir
            .clone()
            .unwrap_or_else(|| self.config_dir.join("downloads"))
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} is not a number: '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_derive_paths_from_dir() {
        let tmp = TempDir::new().unwrap();
        let cfg = ServerConfig::load_with(Some(tmp.path().to_path_buf()), env_of(&[])).unwrap();

        assert_eq!(cfg.rate_limit.max_requests, 50);
        assert_eq!(cfg.rate_limit.window_ms, 60_000);
        assert_eq!(cfg.spam.batch_size, 50);
        assert_eq!(cfg.spam.max_messages, 500);
        assert_eq!(cfg.spam.batch_pause(), Duration::from_secs(1));
        assert_eq!(cfg.credentials_path(), tmp.path().join("credentials.json"));
        assert_eq!(cfg.token_path(), tmp.path().join("token.json"));
        assert_eq!(cfg.audit_log_path(), tmp.path().join("audit.log"));
        assert_eq!(cfg.downloads_dir(), tmp.path().join("downloads"));
        assert_eq!(cfg.gmail_api_base, GMAIL_API_BASE);
    }

    #[test]
    fn test_yaml_then_env_overrides() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "rate_limit:\n  max_requests: 10\nspam:\n  batch_pause_ms: 0\ndownloads_dir: /srv/mail\n",
        )
        .unwrap();

        let cfg = ServerConfig::load_with(
            Some(tmp.path().to_path_buf()),
            env_of(&[("GMAIL_MCP_RATE_LIMIT_WINDOW_MS", "5000")]),
        )
        .unwrap();
        assert_eq!(cfg.rate_limit.max_requests, 10);
        assert_eq!(cfg.rate_limit.window_ms, 5_000);
        assert_eq!(cfg.spam.batch_pause_ms, 0);
        assert_eq!(cfg.spam.batch_size, 50);
        assert_eq!(cfg.downloads_dir(), PathBuf::from("/srv/mail"));
        // config_dir comes from the caller, not the file.
        assert_eq!(cfg.config_dir, tmp.path());
    }

    #[test]
    fn test_env_config_dir_used_without_cli_flag() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_string_lossy().to_string();
        let cfg = ServerConfig::load_with(None, env_of(&[("GMAIL_MCP_CONFIG_DIR", dir.as_str())])).unwrap();
        assert_eq!(cfg.config_dir, tmp.path());
    }

    #[test]
    fn test_rejects_bad_values() {
        let tmp = TempDir::new().unwrap();
        let dir = Some(tmp.path().to_path_buf());

        let err = ServerConfig::load_with(dir.clone(), env_of(&[("GMAIL_MCP_RATE_LIMIT_MAX", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("max_requests"));

        let err =
            ServerConfig::load_with(dir, env_of(&[("GMAIL_MCP_RATE_LIMIT_MAX", "lots")])).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_malformed_yaml() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "rate_limit: [unclosed").unwrap();
        let err = ServerConfig::load_with(Some(tmp.path().to_path_buf()), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
