//! Memoirs - server-rendered page for listing and registering memoir records
//!
//! This crate provides:
//! - A client for the memoir API (`GET`/`POST {base_url}/data`)
//! - A page controller holding the list, the creation panel and notifications
//! - An HTTP server rendering the page and handling its form posts
//!
//! # Usage
//!
//! As a library:
//! ```ignore
//! use memoirs::{Config, MemoirService};
//!
//! let config = Config::from_file("~/.memoirs/config.toml").unwrap();
//! let service = MemoirService::new(config).unwrap();
//! // service.start_server().await.unwrap();
//! ```
//!
//! As a standalone server (CLI):
//! ```text
//! memoirs --config ~/.memoirs/config.toml --api-url http://localhost:3333
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod page;
pub mod session;

// Re-export main types for convenience
pub use client::{HttpMemoirClient, MemoirApi};
pub use config::Config;
pub use error::{AppError, Result};
pub use models::{Draft, Record};

use session::SessionStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Service that wires the API client, page sessions and HTTP server together
pub struct MemoirService {
    /// Configuration
    pub config: Config,

    /// Remote memoir API
    api: Arc<dyn MemoirApi>,

    /// Page sessions
    sessions: Arc<SessionStore>,
}

impl MemoirService {
    /// Create a service talking to the configured memoir API.
    ///
    /// Fails before anything is started when the API base URL is missing or invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let base_url = config.api_base_url()?;
        let client = HttpMemoirClient::new(&base_url, config.api.timeout())?;
        tracing::info!("Using memoir API at {}", client.data_url());
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Create a service with an existing API implementation
    pub fn with_api(config: Config, api: Arc<dyn MemoirApi>) -> Self {
        let sessions = Arc::new(SessionStore::new(
            config.session.idle_timeout(),
            config.session.max_sessions,
        ));
        MemoirService {
            config,
            api,
            sessions,
        }
    }

    /// Get a reference to the page sessions
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Shared handler state
    pub fn app_state(&self) -> api::AppState {
        api::AppState {
            api: self.api.clone(),
            sessions: self.sessions.clone(),
        }
    }

    /// Start the HTTP server (blocks until shutdown)
    pub async fn start_server(&self) -> Result<()> {
        let addr = self.config.server_addr();
        tracing::info!("Starting memoirs server on {}", addr);
        api::serve(addr, self.app_state()).await
    }

    /// Start the periodic sweep that evicts idle page sessions
    pub fn start_session_sweeper(&self) -> JoinHandle<()> {
        use std::time::Duration;

        let sessions = self.sessions.clone();
        let interval = Duration::from_secs(self.config.session.sweep_interval_secs.max(1));

        tracing::info!(
            "Starting page session sweep (every {}s, idle timeout {} minutes)",
            interval.as_secs(),
            self.config.session.idle_timeout_minutes
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = sessions.sweep_expired(chrono::Utc::now()).await;
                if removed > 0 {
                    tracing::info!(
                        "Evicted {} idle page sessions ({} remaining)",
                        removed,
                        sessions.len().await
                    );
                }
            }
        })
    }
}
