use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub accounts: AccountsConfig,

    pub tasks: TasksConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub bind_address: String,

    pub port: u16,

    pub database_path: String,

    /// Directory holding uploaded avatars, served under `/static/uploads`.
    pub upload_dir: String,

    /// Sessions expire after this many minutes without a request.
    pub session_ttl_minutes: i64,

    /// Whether to set the Secure flag on session cookies.
    /// Leave off when serving plain HTTP, or the browser drops the cookie.
    pub secure_cookies: bool,

    /// Request body limit for the multipart profile form.
    pub max_upload_bytes: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            database_path: "sqlite:data/users.db".to_string(),
            upload_dir: "static/uploads".to_string(),
            session_ttl_minutes: 60,
            secure_cookies: false,
            max_upload_bytes: 5 * 1024 * 1024,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    pub bind_address: String,

    pub port: u16,

    pub database_path: String,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5001,
            database_path: "sqlite:data/tasks.db".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Install a Prometheus recorder and expose `GET /metrics`.
    pub metrics_enabled: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tandem").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".tandem").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes the default config to `path` unless a file is already there.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.accounts.port == 0 || self.tasks.port == 0 {
            anyhow::bail!("Service ports must be non-zero");
        }

        if self.accounts.database_path.trim().is_empty()
            || self.tasks.database_path.trim().is_empty()
        {
            anyhow::bail!("database_path cannot be empty");
        }

        if self.accounts.max_upload_bytes == 0 {
            anyhow::bail!("accounts.max_upload_bytes must be > 0");
        }

        if self.security.argon2_memory_cost_kib < 8 * self.security.argon2_parallelism.max(1)
            || self.security.argon2_time_cost == 0
            || self.security.argon2_parallelism == 0
        {
            anyhow::bail!("Invalid argon2 parameters in [security]");
        }

        if self.accounts.upload_dir.trim().is_empty() {
            anyhow::bail!("accounts.upload_dir cannot be empty");
        }

        if self.accounts.session_ttl_minutes <= 0 {
            anyhow::bail!("accounts.session_ttl_minutes must be > 0");
        }

        if self.accounts.min_db_connections > self.accounts.max_db_connections
            || self.tasks.min_db_connections > self.tasks.max_db_connections
        {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.accounts.port, 5000);
        assert_eq!(config.tasks.port, 5001);
        assert_eq!(config.accounts.upload_dir, "static/uploads");
        assert_eq!(config.accounts.session_ttl_minutes, 60);
        assert!(!config.observability.metrics_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[accounts]"));
        assert!(toml_str.contains("[tasks]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [tasks]
            port = 8081
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.tasks.port, 8081);

        assert_eq!(config.accounts.database_path, "sqlite:data/users.db");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.accounts.session_ttl_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tasks.min_db_connections = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.accounts.upload_dir = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security.argon2_time_cost = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tasks.database_path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_create_default_if_missing() {
        let path = std::env::temp_dir()
            .join(format!("tandem-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        assert!(Config::create_default_if_missing(&path).unwrap());
        assert!(!Config::create_default_if_missing(&path).unwrap());

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.accounts.port, 5000);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
