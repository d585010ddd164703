//! ssl-watch
//!
//! Probes TLS endpoints and exports certificate health as Prometheus metrics.
//!
//! # Architecture Overview
//!
//! ```text
//!   config dir (*.json) ──▶ source ──▶ registry ──┐
//!         ▲                   │                   │ domains, ip sets
//!         │ notify / poll     │ version tags      ▼
//!         └──── reload ◀──────┘             scheduler ──▶ probe (DNS + TLS)
//!                                                 │
//!                                                 ▼
//!                        GET /metrics ◀──── metrics store
//! ```

use std::path::PathBuf;

use clap::Parser;

use ssl_watch::config::loader::{read_config, ConfigError};
use ssl_watch::config::validation::validate_config;
use ssl_watch::config::WatchConfig;
use ssl_watch::lifecycle::startup;
use ssl_watch::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "ssl-watch", version)]
#[command(about = "TLS certificate expiry monitor with a Prometheus endpoint", long_about = None)]
struct Cli {
    /// TOML settings file. Defaults apply when omitted.
    #[arg(short, long, env = "SSLWATCH_SETTINGS")]
    settings: Option<PathBuf>,

    /// Directory holding the service documents.
    #[arg(long, env = "SSLWATCH_CONFIG_DIR")]
    config_dir: Option<String>,

    /// Suffix of service document file names.
    #[arg(long, env = "SSLWATCH_CONFIG_FILE_SUFFIX")]
    config_file_suffix: Option<String>,

    /// Seconds between sweeps.
    #[arg(long, env = "SSLWATCH_SCRAPE_INTERVAL")]
    scrape_interval: Option<u64>,

    /// Seconds between config change checks; 0 disables polling.
    #[arg(long, env = "SSLWATCH_RELOAD_POLL")]
    reload_poll: Option<u64>,

    /// TCP connect timeout in seconds.
    #[arg(long, env = "SSLWATCH_CONNECTION_TIMEOUT")]
    connection_timeout: Option<u64>,

    /// DNS lookup timeout in seconds.
    #[arg(long, env = "SSLWATCH_LOOKUP_TIMEOUT")]
    lookup_timeout: Option<u64>,

    /// Metrics endpoint bind address.
    #[arg(long, env = "SSLWATCH_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Debug-level logging.
    #[arg(long, env = "SSLWATCH_DEBUG_MODE")]
    debug: bool,

    /// Do not watch the config directory for changes.
    #[arg(long)]
    no_watch: bool,
}

impl Cli {
    fn settings(&self) -> Result<WatchConfig, ConfigError> {
        let mut config = match &self.settings {
            Some(path) => read_config(path)?,
            None => WatchConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, config: &mut WatchConfig) {
        if let Some(dir) = &self.config_dir {
            config.source.config_dir = dir.clone();
        }
        if let Some(suffix) = &self.config_file_suffix {
            config.source.config_file_suffix = suffix.clone();
        }
        if let Some(secs) = self.scrape_interval {
            config.schedule.scrape_interval_secs = secs;
        }
        if let Some(secs) = self.reload_poll {
            config.schedule.reload_poll_secs = secs;
        }
        if let Some(secs) = self.connection_timeout {
            config.probe.connection_timeout_secs = secs;
        }
        if let Some(secs) = self.lookup_timeout {
            config.probe.lookup_timeout_secs = secs;
        }
        if let Some(address) = &self.bind_address {
            config.observability.bind_address = address.clone();
        }
        if self.debug {
            config.observability.debug = true;
        }
        if self.no_watch {
            config.source.watch = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().settings()?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_dir = %config.source.config_dir,
        suffix = %config.source.config_file_suffix,
        scrape_interval_secs = config.schedule.scrape_interval_secs,
        bind_address = %config.observability.bind_address,
        "ssl-watch starting"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }
    Ok(())
}
