//! Application configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/midinero/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top (see [`Config::apply_env`]).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::analytics::dashboard::{
    DEFAULT_PATTERN_DAYS, DEFAULT_PREDICTION_MONTHS, DEFAULT_TREND_MONTHS, PATTERN_DAYS,
    PREDICTION_MONTHS, TREND_MONTHS,
};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/midinero.toml");

/// HS256 secret used to validate bearer tokens
pub const JWT_SECRET_ENV: &str = "MIDINERO_JWT_SECRET";

/// Comma-separated list of allowed CORS origins
pub const ALLOWED_ORIGINS_ENV: &str = "MIDINERO_ALLOWED_ORIGINS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub dashboard: DashboardDefaults,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Empty means same-origin only
    pub allowed_origins: Vec<String>,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthSettings {
    pub jwt_secret: Option<String>,
    pub dev_user: String,
}

/// Window sizes used when a request doesn't specify one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardDefaults {
    pub trend_months: u32,
    pub pattern_days: u32,
    pub prediction_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "midinero.db".to_string(),
            },
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
                allowed_origins: vec![],
                static_dir: None,
            },
            auth: AuthSettings {
                jwt_secret: None,
                dev_user: "dev".to_string(),
            },
            dashboard: DashboardDefaults::default(),
        }
    }
}

impl Default for DashboardDefaults {
    fn default() -> Self {
        Self {
            trend_months: DEFAULT_TREND_MONTHS,
            pattern_days: DEFAULT_PATTERN_DAYS,
            prediction_months: DEFAULT_PREDICTION_MONTHS,
        }
    }
}

impl Config {
    /// Load config (explicit path, then data dir override, then embedded
    /// defaults) and apply environment overrides
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = load_file(override_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(JWT_SECRET_ENV).filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(origins) = lookup(ALLOWED_ORIGINS_ENV) {
            self.server.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("midinero").join("config.toml"))
}

fn load_file(override_path: Option<&Path>) -> Result<Config> {
    let path = match override_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path.to_path_buf())
        }
        None => default_config_path().filter(|p| p.exists()),
    };

    let content = match &path {
        Some(path) => {
            debug!(path = %path.display(), "Loading config override");
            fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    database: Option<RawDatabase>,
    server: Option<RawServer>,
    auth: Option<RawAuth>,
    dashboard: Option<RawDashboard>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawAuth {
    jwt_secret: Option<String>,
    dev_user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDashboard {
    trend_months: Option<u32>,
    pattern_days: Option<u32>,
    prediction_months: Option<u32>,
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(database) = raw.database {
        if let Some(path) = database.path {
            config.database.path = path;
        }
    }

    if let Some(server) = raw.server {
        if let Some(host) = server.host {
            config.server.host = host;
        }
        if let Some(port) = server.port {
            config.server.port = port;
        }
        if let Some(origins) = server.allowed_origins {
            config.server.allowed_origins = origins;
        }
        config.server.static_dir = server.static_dir;
    }

    if let Some(auth) = raw.auth {
        config.auth.jwt_secret = auth.jwt_secret.filter(|s| !s.is_empty());
        if let Some(dev_user) = auth.dev_user {
            config.auth.dev_user = dev_user;
        }
    }

    if let Some(dashboard) = raw.dashboard {
        let defaults = &mut config.dashboard;
        if let Some(months) = dashboard.trend_months {
            defaults.trend_months = bounded("dashboard.trend_months", months, &TREND_MONTHS)?;
        }
        if let Some(days) = dashboard.pattern_days {
            defaults.pattern_days = bounded("dashboard.pattern_days", days, &PATTERN_DAYS)?;
        }
        if let Some(months) = dashboard.prediction_months {
            defaults.prediction_months =
                bounded("dashboard.prediction_months", months, &PREDICTION_MONTHS)?;
        }
    }

    Ok(config)
}

fn bounded(name: &str, value: u32, range: &std::ops::RangeInclusive<u32>) -> Result<u32> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(Error::Config(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.dev_user, "dev");
        assert!(config.server.allowed_origins.is_empty());
        assert_eq!(config.dashboard, DashboardDefaults::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [dashboard]
            prediction_months = 9
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.dashboard.prediction_months, 9);
        assert_eq!(config.dashboard.trend_months, DEFAULT_TREND_MONTHS);
    }

    #[test]
    fn test_out_of_range_dashboard_default_rejected() {
        let result = Config::from_toml("[dashboard]\npattern_days = 1000\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            Config::from_toml("[server\nport = "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            JWT_SECRET_ENV => Some("s3cret".to_string()),
            ALLOWED_ORIGINS_ENV => Some("http://a.test, http://b.test,".to_string()),
            _ => None,
        });

        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/midinero.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
