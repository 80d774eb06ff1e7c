//! Configuration management for Memoirs
//!
//! Loads settings from TOML file at ~/.memoirs/config.toml, then applies
//! `MEMOIRS_*` environment overrides.

use crate::error::{AppError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the memoir API base URL
pub const API_URL_ENV: &str = "MEMOIRS_API_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote memoir API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Page session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Server host (default: 127.0.0.1 - localhost only)
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Remote memoir API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the memoir API; records live under `{base_url}/data`.
    /// No default: startup fails if neither the file nor `MEMOIRS_API_URL` sets it.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Page session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minutes a page session may stay idle before it is evicted
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u32,

    /// Seconds between eviction sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Upper bound on live page sessions; the least recently seen is evicted beyond it
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_idle_timeout() -> u32 {
    60
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_max_sessions() -> usize {
    10_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            idle_timeout_minutes: default_idle_timeout(),
            sweep_interval_secs: default_sweep_interval(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.idle_timeout_minutes as i64)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_path(path.as_ref());

        if !path.exists() {
            return Err(AppError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> SocketAddr {
        use std::net::ToSocketAddrs;

        format!("{}:{}", self.server.host, self.server.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], self.server.port)))
    }

    /// Resolve and validate the memoir API base URL.
    ///
    /// Fails when the URL is unset, blank, unparsable, or not http(s).
    pub fn api_base_url(&self) -> Result<Url> {
        let raw = self
            .api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::Config(format!(
                    "memoir API base URL is not set (use [api] base_url or {})",
                    API_URL_ENV
                ))
            })?;

        let url = Url::parse(raw)
            .map_err(|e| AppError::Config(format!("invalid API base URL {:?}: {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AppError::Config(format!(
                "API base URL must use http or https, got {:?}",
                other
            ))),
        }
    }

    /// Check the settings the service cannot start without
    pub fn validate(&self) -> Result<()> {
        self.api_base_url()?;
        if self.api.timeout_secs == 0 {
            return Err(AppError::Config(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.session.max_sessions == 0 {
            return Err(AppError::Config(
                "session.max_sessions must be greater than zero".to_string(),
            ));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(AppError::Config(
                "session.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get list of active environment overrides
    pub fn active_env_overrides() -> Vec<String> {
        [API_URL_ENV, "MEMOIRS_SERVER_HOST", "MEMOIRS_SERVER_PORT"]
            .iter()
            .filter(|name| std::env::var(name).is_ok())
            .map(|name| name.to_string())
            .collect()
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api.base_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(host) = lookup("MEMOIRS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MEMOIRS_SERVER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid MEMOIRS_SERVER_PORT: {}", port),
            }
        }
    }

    /// Create a default configuration file at the given path
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let content = r#"# Memoirs Configuration

[server]
# Port to listen on (default: 3000)
port = 3000

# Host to bind to
# "127.0.0.1" = localhost only
# "0.0.0.0" = all interfaces
host = "127.0.0.1"

[api]
# Base URL of the memoir API (records are read from and posted to {base_url}/data).
# Required. Can also be set with the MEMOIRS_API_URL environment variable.
# base_url = "http://localhost:3333"
timeout_secs = 30

[session]
# Idle page sessions are dropped after this many minutes
idle_timeout_minutes = 60
sweep_interval_secs = 300
# Oldest idle page is dropped when a new page would exceed this
max_sessions = 10000
"#;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// Expand ~ to home directory in paths
pub fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
