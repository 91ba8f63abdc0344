//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: SHAPING_, nested keys separated by `__`,
//!    e.g. `SHAPING_PAGING__MAX_PAGE_SIZE=50`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/resource-shaping/{service_name}/config.toml
//! 4. System directory: /etc/resource-shaping/{service_name}/config.toml
//! 5. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

const ENV_PREFIX: &str = "SHAPING_";
const CONFIG_DIR: &str = "resource-shaping";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Collection paging limits
    #[serde(default)]
    pub paging: PagingConfig,

    /// Startup seeding retry budget
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Absolute base URL that hypermedia links are rendered against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Paging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size used when the client gives none
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    /// Larger requested page sizes are capped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Seeding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Maximum seeding attempts before giving up
    #[serde(default = "default_seed_max_retries")]
    pub max_retries: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_seed_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl SeedConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            max_retries: default_seed_max_retries(),
            retry_delay_ms: default_seed_retry_delay_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> i64 {
    MAX_PAGE_SIZE
}

fn default_seed_max_retries() -> u32 {
    10
}

fn default_seed_retry_delay_ms() -> u64 {
    100
}

impl Config {
    /// Load configuration for a specific service name
    ///
    /// Files found on the search path are merged lowest priority first;
    /// environment variables override all of them.
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::named(service_name)));

        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses the search path. Useful for testing or non-standard deployments.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Defaults with the given service name
    pub fn named(service_name: &str) -> Self {
        let mut config = Self::default();
        config.service.name = service_name.to_string();
        config
    }

    /// Possible config file paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR);
        if let Some(path) = xdg_dirs.find_config_file(Path::new(service_name).join("config.toml")) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: CONFIG_DIR.to_string(),
                log_level: default_log_level(),
                environment: default_environment(),
                base_url: default_base_url(),
            },
            paging: PagingConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.service.base_url, "http://localhost:5000");
        assert_eq!(config.paging.default_page_size, 10);
        assert_eq!(config.paging.max_page_size, 100);
        assert_eq!(config.seed.max_retries, 10);
        assert_eq!(config.seed.retry_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_named_config() {
        let config = Config::named("blog-service");
        assert_eq!(config.service.name, "blog-service");
        assert_eq!(config.paging, PagingConfig::default());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "blog-service"
base_url = "https://blog.example.com"

[paging]
max_page_size = 25

[seed]
max_retries = 3
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "blog-service");
        assert_eq!(config.service.base_url, "https://blog.example.com");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.paging.max_page_size, 25);
        assert_eq!(config.paging.default_page_size, 10);
        assert_eq!(config.seed.max_retries, 3);
        assert_eq!(config.seed.retry_delay_ms, 100);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.paging, PagingConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[paging]\nmax_page_size = \"lots\"").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(crate::Error::Config(_))
        ));
    }
}
