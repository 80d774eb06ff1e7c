//! Memoirs CLI - standalone server for the memoir page

use clap::Parser;
use memoirs::config::expand_path;
use memoirs::{Config, MemoirService};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "memoirs")]
#[command(author = "Memoirs Team")]
#[command(version)]
#[command(about = "Memoirs - list and register memoir records", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.memoirs/config.toml")]
    config: PathBuf,

    /// Base URL of the memoir API (overrides the config file)
    #[arg(long, env = "MEMOIRS_API_URL")]
    api_url: Option<String>,

    /// Override server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override server host
    #[arg(long)]
    host: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initialize a new config file with defaults
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("memoirs={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = expand_path(&args.config);

    // Handle --init flag
    if args.init {
        if config_path.exists() {
            tracing::warn!("Config file already exists: {}", config_path.display());
            return Ok(());
        }
        Config::create_default(&config_path)?;
        tracing::info!("Created default config at: {}", config_path.display());
        return Ok(());
    }

    // Load configuration
    let mut config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        tracing::warn!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        Config::default()
    };

    config.apply_env_overrides();
    let overrides = Config::active_env_overrides();
    if !overrides.is_empty() {
        tracing::debug!("Environment overrides active: {}", overrides.join(", "));
    }

    // Apply CLI overrides
    if let Some(api_url) = args.api_url {
        config.api.base_url = Some(api_url);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    // Fails fast on a missing or invalid API base URL
    let service = MemoirService::new(config)?;

    let _sweeper = service.start_session_sweeper();

    // Start HTTP server (blocks until shutdown)
    service.start_server().await?;

    Ok(())
}
